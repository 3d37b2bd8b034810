// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! In-process management registry.
//!
//! A [`ManagementRegistry`] maps [`ObjectName`]s to [`ManagedBean`]s so an
//! operator-facing endpoint can look up a metric by a fixed name and read
//! its attributes. The registry is an ordinary value: the composition root
//! creates it and shares it (usually behind an `Arc`) with both the
//! monitoring setup and whatever serves queries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use crate::error::{Error, RegistrationError, Result};

/// A parsed management name of the form `domain:key=value[,key=value]*`.
///
/// Key order does not matter: `a:x=1,y=2` and `a:y=2,x=1` are the same name.
/// [`Display`](fmt::Display) prints the canonical form with keys sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
}

impl ObjectName {
    /// Parses `name`, rejecting anything that is not `domain:key=value[,key=value]*`.
    ///
    /// ```rust
    /// use actor_monitor::ObjectName;
    ///
    /// let name = ObjectName::parse("monitor:type=Performance").unwrap();
    /// assert_eq!(name.domain(), "monitor");
    /// assert_eq!(name.property("type"), Some("Performance"));
    /// assert!(ObjectName::parse("monitor").is_err());
    /// ```
    pub fn parse(name: &str) -> std::result::Result<Self, RegistrationError> {
        let malformed = |details: &str| RegistrationError::MalformedName {
            name: name.to_string(),
            details: details.to_string(),
        };

        let (domain, props) = name
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' between domain and properties"))?;
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(malformed("empty domain"));
        }
        if props.trim().is_empty() {
            return Err(malformed("no key properties"));
        }

        let mut properties = BTreeMap::new();
        for pair in props.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| malformed(&format!("property '{pair}' is not key=value")))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(malformed(&format!("property '{pair}' has an empty key or value")));
            }
            if [':', '=', ','].iter().any(|c| key.contains(*c) || value.contains(*c)) {
                return Err(malformed(&format!("property '{pair}' contains a reserved character")));
            }
            if properties.insert(key.to_string(), value.to_string()).is_some() {
                return Err(malformed(&format!("duplicate key '{key}'")));
            }
        }

        Ok(Self {
            domain: domain.to_string(),
            properties,
        })
    }

    /// Returns the domain part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the value of `key`, if present.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectName {
    type Err = RegistrationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A component that exposes numeric attributes through a [`ManagementRegistry`].
pub trait ManagedBean: Send + Sync + 'static {
    /// Names of the attributes this bean exposes.
    fn attribute_names(&self) -> &'static [&'static str];

    /// Reads attribute `name`, or `None` if the bean has no such attribute.
    fn attribute(&self, name: &str) -> Option<f64>;
}

/// A thread-safe registry of named management beans.
#[derive(Default)]
pub struct ManagementRegistry {
    beans: Mutex<BTreeMap<ObjectName, Arc<dyn ManagedBean>>>,
}

impl ManagementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bean` under `name` and returns the parsed name.
    ///
    /// Fails with [`RegistrationError::MalformedName`] if `name` does not parse,
    /// or [`RegistrationError::AlreadyRegistered`] if the name is taken.
    pub fn register(
        &self,
        name: &str,
        bean: Arc<dyn ManagedBean>,
    ) -> std::result::Result<ObjectName, RegistrationError> {
        let object_name = ObjectName::parse(name)?;

        let mut beans = self.beans.lock();
        if beans.contains_key(&object_name) {
            debug!("Registration of {} rejected: name in use.", object_name);
            return Err(RegistrationError::AlreadyRegistered {
                name: object_name.to_string(),
            });
        }
        beans.insert(object_name.clone(), bean);
        drop(beans);

        info!("Registered management bean {}.", object_name);
        Ok(object_name)
    }

    /// Removes the bean registered under `name`.
    pub fn unregister(&self, name: &ObjectName) -> Result<()> {
        match self.beans.lock().remove(name) {
            Some(_) => {
                info!("Unregistered management bean {}.", name);
                Ok(())
            }
            None => Err(Error::InstanceNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Returns `true` if a bean is registered under `name`.
    pub fn is_registered(&self, name: &ObjectName) -> bool {
        self.beans.lock().contains_key(name)
    }

    /// Returns all registered names in canonical order.
    pub fn names(&self) -> Vec<ObjectName> {
        self.beans.lock().keys().cloned().collect()
    }

    /// Reads `attribute` from the bean registered under `name`.
    ///
    /// The bean is read outside the registry lock.
    pub fn get_attribute(&self, name: &str, attribute: &str) -> Result<f64> {
        let object_name = ObjectName::parse(name)?;
        let bean = self
            .beans
            .lock()
            .get(&object_name)
            .cloned()
            .ok_or_else(|| Error::InstanceNotFound {
                name: object_name.to_string(),
            })?;

        bean.attribute(attribute)
            .ok_or_else(|| Error::AttributeNotFound {
                name: object_name.to_string(),
                attribute: attribute.to_string(),
            })
    }
}

impl fmt::Debug for ManagementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl ManagedBean for Fixed {
        fn attribute_names(&self) -> &'static [&'static str] {
            &["Value"]
        }

        fn attribute(&self, name: &str) -> Option<f64> {
            (name == "Value").then_some(self.0)
        }
    }

    #[test]
    fn test_parse_canonicalizes_key_order() {
        let a = ObjectName::parse("app:type=Performance,name=main").unwrap();
        let b = ObjectName::parse("app: name = main , type=Performance").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "app:name=main,type=Performance");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "monitor",
            ":type=Performance",
            "monitor:",
            "monitor:type",
            "monitor:type=",
            "monitor:=Performance",
            "monitor:type=a,type=b",
            "monitor:type=a:b",
        ] {
            assert!(
                matches!(
                    ObjectName::parse(bad),
                    Err(RegistrationError::MalformedName { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_register_and_query() {
        let registry = ManagementRegistry::new();
        let name = registry
            .register("test:type=Fixed", Arc::new(Fixed(2.5)))
            .unwrap();

        assert!(registry.is_registered(&name));
        assert_eq!(registry.get_attribute("test:type=Fixed", "Value").unwrap(), 2.5);
        assert!(matches!(
            registry.get_attribute("test:type=Fixed", "Other"),
            Err(Error::AttributeNotFound { .. })
        ));
        assert!(matches!(
            registry.get_attribute("test:type=Missing", "Value"),
            Err(Error::InstanceNotFound { .. })
        ));
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = ManagementRegistry::new();
        registry
            .register("test:type=Fixed", Arc::new(Fixed(1.0)))
            .unwrap();

        let err = registry
            .register("test:type=Fixed", Arc::new(Fixed(2.0)))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::AlreadyRegistered {
                name: "test:type=Fixed".to_string()
            }
        );
        // The first registration is untouched.
        assert_eq!(registry.get_attribute("test:type=Fixed", "Value").unwrap(), 1.0);
    }

    #[test]
    fn test_unregister() {
        let registry = ManagementRegistry::new();
        let name = registry
            .register("test:type=Fixed", Arc::new(Fixed(1.0)))
            .unwrap();

        registry.unregister(&name).unwrap();
        assert!(!registry.is_registered(&name));
        assert!(registry.names().is_empty());
        assert!(matches!(
            registry.unregister(&name),
            Err(Error::InstanceNotFound { .. })
        ));
    }
}
