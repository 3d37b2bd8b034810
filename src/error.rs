// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised while registering a management bean.
///
/// These are returned by [`ManagementRegistry::register`](crate::ManagementRegistry::register)
/// and by [`Monitor::start`](crate::Monitor::start). The counter itself never fails.
pub enum RegistrationError {
    /// The object name does not follow `domain:key=value[,key=value]*`
    MalformedName {
        /// The rejected name as given
        name: String,
        /// What is wrong with it
        details: String,
    },
    /// A bean is already registered under this name
    AlreadyRegistered {
        /// The canonical name that is taken
        name: String,
    },
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::MalformedName { name, details } => {
                write!(f, "Malformed object name '{name}': {details}")
            }
            RegistrationError::AlreadyRegistered { name } => {
                write!(f, "A bean is already registered as '{name}'")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

#[derive(Debug)]
/// Represents errors that can occur in actor-monitor.
///
/// These may be returned by registry queries such as
/// [`get_attribute`](crate::ManagementRegistry::get_attribute), or by mailbox
/// operations such as [`tell`](crate::Mailbox::tell).
pub enum Error {
    /// Error when registering a management bean
    Registration(RegistrationError),
    /// No bean is registered under the requested name
    InstanceNotFound {
        /// The name that was looked up
        name: String,
    },
    /// The bean exists but does not expose the requested attribute
    AttributeNotFound {
        /// The bean's name
        name: String,
        /// The missing attribute
        attribute: String,
    },
    /// Error when sending a message to a mailbox
    Send {
        /// Type name of the receiver behind the mailbox
        receiver: &'static str,
        /// Additional context about the error
        details: String,
    },
    /// Error when awaiting a receiver's JoinHandle fails
    Join {
        /// The original JoinError from tokio
        source: tokio::task::JoinError,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Registration(e) => write!(f, "Registration failed: {e}"),
            Error::InstanceNotFound { name } => {
                write!(f, "No bean registered as '{name}'")
            }
            Error::AttributeNotFound { name, attribute } => {
                write!(f, "Bean '{name}' has no attribute '{attribute}'")
            }
            Error::Send { receiver, details } => {
                write!(f, "Failed to send message to {receiver}: {details}")
            }
            Error::Join { source } => {
                write!(f, "Failed to join receiver task: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registration(e) => Some(e),
            Error::Join { source } => Some(source),
            _ => None,
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(e: RegistrationError) -> Self {
        Error::Registration(e)
    }
}

/// A Result type specialized for actor-monitor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_registration_error_display() {
        let e = RegistrationError::AlreadyRegistered {
            name: "monitor:type=Performance".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "A bean is already registered as 'monitor:type=Performance'"
        );
    }

    #[test]
    fn test_error_source_chains_registration() {
        let e: Error = RegistrationError::MalformedName {
            name: "oops".to_string(),
            details: "missing ':'".to_string(),
        }
        .into();

        assert!(e.to_string().starts_with("Registration failed: Malformed object name 'oops'"));
        assert!(e.source().is_some());
    }

    #[test]
    fn test_attribute_not_found_has_no_source() {
        let e = Error::AttributeNotFound {
            name: "monitor:type=Performance".to_string(),
            attribute: "Latency".to_string(),
        };
        assert!(e.source().is_none());
        assert!(e.to_string().contains("Latency"));
    }
}
