// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! System session properties understood by the coordinator

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::memory::DataSize;

pub const QUERY_MAX_MEMORY: &str = "query_max_memory";
pub const EXECUTION_POLICY: &str = "execution_policy";
pub const QUERY_PRIORITY: &str = "query_priority";
pub const REDISTRIBUTE_WRITES: &str = "redistribute_writes";

/// Value type of a session property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Boolean,
    Integer,
    Varchar,
    DataSize,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "boolean",
            PropertyType::Integer => "integer",
            PropertyType::Varchar => "varchar",
            PropertyType::DataSize => "varchar(data size)",
        }
    }

    /// Check that `value` decodes as this type
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            PropertyType::Boolean => value
                .parse::<bool>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a valid boolean", value)),
            PropertyType::Integer => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a valid integer", value)),
            PropertyType::Varchar => Ok(()),
            PropertyType::DataSize => value.parse::<DataSize>().map(|_| ()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SystemSessionProperty {
    pub name: &'static str,
    pub description: &'static str,
    pub property_type: PropertyType,
    /// `None` means the coordinator configuration supplies the default
    pub default_value: Option<&'static str>,
}

pub static SYSTEM_SESSION_PROPERTIES: Lazy<BTreeMap<&'static str, SystemSessionProperty>> =
    Lazy::new(|| {
        [
            SystemSessionProperty {
                name: QUERY_MAX_MEMORY,
                description: "Maximum amount of distributed memory a query can use",
                property_type: PropertyType::DataSize,
                default_value: None,
            },
            SystemSessionProperty {
                name: EXECUTION_POLICY,
                description: "Policy used for scheduling query tasks",
                property_type: PropertyType::Varchar,
                default_value: None,
            },
            SystemSessionProperty {
                name: QUERY_PRIORITY,
                description: "The priority of queries. Larger numbers are higher priority",
                property_type: PropertyType::Integer,
                default_value: Some("1"),
            },
            SystemSessionProperty {
                name: REDISTRIBUTE_WRITES,
                description: "Force parallel distributed writes",
                property_type: PropertyType::Boolean,
                default_value: Some("true"),
            },
        ]
        .into_iter()
        .map(|property| (property.name, property))
        .collect()
    });

pub fn system_session_property(name: &str) -> Option<&'static SystemSessionProperty> {
    SYSTEM_SESSION_PROPERTIES.get(name)
}

/// Validate a system property assignment; the error is a user-facing message
pub fn validate_system_property(name: &str, value: &str) -> Result<(), String> {
    let property = system_session_property(name)
        .ok_or_else(|| format!("Session property {} does not exist", name))?;
    property
        .property_type
        .validate(value)
        .map_err(|e| format!("Invalid value for session property {}: {}", name, e))
}
