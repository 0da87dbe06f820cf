//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use cfgweave::{take_field, ConfigType, ObjectDescriptor, TypeDescriptor, Value};
use std::path::{Path, PathBuf};

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// The `[db]` table of app.toml
#[derive(Debug, Clone, PartialEq)]
pub struct Db {
    pub port: i32,
    pub uri: String,
    pub password: String,
}

impl ConfigType for Db {
    fn type_descriptor() -> TypeDescriptor {
        ObjectDescriptor::new("Db")
            .field("port", i32::type_descriptor())
            .field("uri", String::type_descriptor())
            .field("password", String::type_descriptor())
            .build()
    }

    fn from_value(value: Value) -> Option<Self> {
        let mut fields = value.into_fields()?;
        Some(Db {
            port: take_field(&mut fields, "port")?,
            uri: take_field(&mut fields, "uri")?,
            password: take_field(&mut fields, "password")?,
        })
    }
}

/// One entry of `db.hosts`
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub url: String,
    pub password: String,
}

impl ConfigType for Host {
    fn type_descriptor() -> TypeDescriptor {
        ObjectDescriptor::new("Host")
            .field("url", String::type_descriptor())
            .field("password", String::type_descriptor())
            .build()
    }

    fn from_value(value: Value) -> Option<Self> {
        let mut fields = value.into_fields()?;
        Some(Host {
            url: take_field(&mut fields, "url")?,
            password: take_field(&mut fields, "password")?,
        })
    }
}

/// `[http.pool]` with a defaulted and an optional field
#[derive(Debug, Clone, PartialEq)]
pub struct HttpPool {
    pub max_total: u32,
    pub keep_alive: bool,
    pub idle_timeout: std::time::Duration,
    pub name: Option<String>,
}

impl ConfigType for HttpPool {
    fn type_descriptor() -> TypeDescriptor {
        ObjectDescriptor::new("HttpPool")
            .field("maxTotal", u32::type_descriptor())
            .field("keepAlive", bool::type_descriptor())
            .field_with_default(
                "idleTimeout",
                std::time::Duration::type_descriptor(),
                "5s",
            )
            .field("name", Option::<String>::type_descriptor())
            .build()
    }

    fn from_value(value: Value) -> Option<Self> {
        let mut fields = value.into_fields()?;
        Some(HttpPool {
            max_total: take_field(&mut fields, "maxTotal")?,
            keep_alive: take_field(&mut fields, "keepAlive")?,
            idle_timeout: take_field(&mut fields, "idleTimeout")?,
            name: take_field(&mut fields, "name")?,
        })
    }
}
