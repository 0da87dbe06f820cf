//! Validation errors collected while resolving configuration.
//!
//! Every stage of the pipeline reports problems as values of
//! [`ValidationError`] instead of failing fast. Each kind carries a [`Level`]
//! which the outermost query surface uses to decide whether a lookup failed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    /// Fatal for the sub-lookup that produced it.
    Error,
    /// A required value is absent.
    MissingValue,
    /// A discretionary value (optional field, defaulted field, sparse array slot) is absent.
    MissingOptionalValue,
    /// Advisory; fatal only when warnings are treated as errors.
    Warning,
    /// Advisory only.
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::MissingValue => write!(f, "MISSING_VALUE"),
            Self::MissingOptionalValue => write!(f, "MISSING_OPTIONAL_VALUE"),
            Self::Warning => write!(f, "WARNING"),
            Self::Info => write!(f, "INFO"),
        }
    }
}

/// A problem found while tokenizing, merging, navigating, substituting or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationError {
    // --- lexer -------------------------------------------------------------
    #[error("empty path provided")]
    EmptyPath,

    #[error("empty element for path: {path}")]
    EmptyElement { path: String },

    #[error("unable to tokenize element {element} for path: {path}")]
    FailedToTokenizeElement { element: String, path: String },

    #[error("unable to parse a name for path: {path}")]
    UnableToParseName { path: String },

    #[error("unable to parse array index {index} in element {element} for path: {path}")]
    InvalidArrayToken {
        element: String,
        index: String,
        path: String,
    },

    #[error("array index {index} in element {element} must not be negative, for path: {path}")]
    InvalidArrayNegativeIndexToken {
        element: String,
        index: i64,
        path: String,
    },

    #[error("array element {element} is missing its index, for path: {path}")]
    InvalidArrayIndexToken { element: String, path: String },

    // --- navigation --------------------------------------------------------
    #[error("unable to find node matching path: {path}, for {token}, during {stage}")]
    NoResultsFoundForNode {
        path: String,
        token: String,
        stage: String,
    },

    #[error("null node found for path: {path}")]
    NullNodeForPath { path: String },

    // --- decoding ----------------------------------------------------------
    #[error("no decoders found for type: {type_name}, on path: {path}")]
    NoDecodersFound { type_name: String, path: String },

    #[error("unable to parse a number on path: {path}, from value: {value}, with decoder: {decoder}")]
    DecodingNumberFormat {
        path: String,
        value: String,
        decoder: String,
    },

    #[error("unable to decode a number on path: {path}, from value: {value}, with decoder: {decoder}: {reason}")]
    DecodingNumberParsing {
        path: String,
        value: String,
        decoder: String,
        reason: String,
    },

    #[error("unable to parse a boolean on path: {path}, from value: {value}")]
    DecodingBoolean { path: String, value: String },

    #[error("expected a single character on path: {path}, received: {value}")]
    DecodingChar { path: String, value: String },

    #[error("unable to parse a UUID on path: {path}, from value: {value}: {reason}")]
    DecodingUuid {
        path: String,
        value: String,
        reason: String,
    },

    #[error("unable to parse a duration on path: {path}, from value: {value}")]
    DecodingDuration { path: String, value: String },

    #[error("unable to parse a date/time on path: {path}, from value: {value} with format {format}: {reason}")]
    DecodingDateTime {
        path: String,
        value: String,
        format: String,
        reason: String,
    },

    #[error("value {value} on path: {path} is not a variant of enum {enum_name}, expected one of [{variants}]")]
    DecodingEnum {
        path: String,
        value: String,
        enum_name: String,
        variants: String,
    },

    #[error("leaf on path: {path} is missing a value, with decoder: {decoder}")]
    DecodingLeafMissingValue { path: String, decoder: String },

    #[error("array on path: {path} has no values, with decoder: {decoder}")]
    DecodingArrayMissingValue { path: String, decoder: String },

    #[error("expected a leaf on path: {path}, received a {found}, with decoder: {decoder}")]
    DecodingExpectedLeafNodeType {
        path: String,
        found: String,
        decoder: String,
    },

    #[error("expected an array on path: {path}, received a {found}, with decoder: {decoder}")]
    DecodingExpectedArrayNodeType {
        path: String,
        found: String,
        decoder: String,
    },

    #[error("expected a map on path: {path}, received a {found}, with decoder: {decoder}")]
    DecodingExpectedMapNodeType {
        path: String,
        found: String,
        decoder: String,
    },

    #[error("missing array index: {index} for path: {path}")]
    ArrayMissingIndex {
        path: String,
        index: usize,
        fatal: bool,
    },

    #[error("missing value for field: {field}, of type: {type_name}, on path: {path}")]
    MissingValueForNodePath {
        path: String,
        field: String,
        type_name: String,
    },

    #[error("missing optional value for field: {field}, of type: {type_name}, on path: {path}")]
    OptionalMissingValueDecoding {
        path: String,
        field: String,
        type_name: String,
    },

    #[error("decoding exceeded the maximum nested depth of {max_depth} on path: {path}")]
    DecoderDepthExceeded { path: String, max_depth: usize },

    #[error("decoded value on path: {path} could not be converted into {type_name}")]
    FailedToConvertValue { path: String, type_name: String },

    // --- substitution ------------------------------------------------------
    #[error("unexpected closing token {token} at index {index} in value: {value}, on path: {path}")]
    UnexpectedClosingTokenTransform {
        path: String,
        value: String,
        token: String,
        index: usize,
    },

    #[error("unclosed substitution in value: {value}, on path: {path}")]
    UnclosedSubstitutionTransform { path: String, value: String },

    #[error("substitution exceeded the maximum nested depth of {max_depth} in value: {value}, on path: {path}")]
    SubstitutionDepthExceeded {
        path: String,
        value: String,
        max_depth: usize,
    },

    #[error("invalid substitution expression: {value}, on path: {path}")]
    InvalidStringSubstitution { path: String, value: String },

    #[error("no transform named {transform} is registered, on path: {path}")]
    UnknownTransform { path: String, transform: String },

    #[error("no transform produced a value for key: {key}, on path: {path}")]
    NoMatchingTransformFound { path: String, key: String },

    #[error("no environment variable found for: {key}, on path: {path}")]
    NoEnvironmentVariableFound { path: String, key: String },

    #[error("no custom map value found for: {key}, on path: {path}")]
    NoCustomMapValueFound { path: String, key: String },

    #[error("unable to read file: {file}, on path: {path}: {reason}")]
    FileTransformFailed {
        path: String,
        file: String,
        reason: String,
    },

    #[error("unable to base64 decode value on path: {path}: {reason}")]
    Base64DecodeFailed { path: String, reason: String },

    #[error("invalid random parameter: {parameter}, on path: {path}")]
    InvalidRandomParameter { path: String, parameter: String },

    // --- merge and load ----------------------------------------------------
    #[error("type mismatch during merge on path: {path}, replacing {base} with {overlay}")]
    TypeMismatchDuringMerge {
        path: String,
        base: String,
        overlay: String,
    },

    #[error("malformed import parameter {entry} in {parameters}, on path: {path}")]
    ConfigNodeImportMalformed {
        path: String,
        parameters: String,
        entry: String,
    },

    #[error("import node on path: {path} must be a leaf, received a {found}")]
    ConfigNodeImportWrongNodeType { path: String, found: String },

    #[error("import node on path: {path} has no parameters")]
    ConfigNodeImportNodeEmpty { path: String },

    #[error("no source factory named {factory} for import on path: {path}")]
    NoSourceFactoryFound { path: String, factory: String },

    #[error("unable to load source {source_name}: {reason}")]
    SourceLoadFailed { source_name: String, reason: String },
}

impl ValidationError {
    /// Severity of this error.
    pub fn level(&self) -> Level {
        match self {
            Self::ArrayMissingIndex { fatal, .. } => {
                if *fatal {
                    Level::Error
                } else {
                    Level::MissingOptionalValue
                }
            }
            Self::MissingValueForNodePath { .. } | Self::NoResultsFoundForNode { .. } => {
                Level::MissingValue
            }
            Self::OptionalMissingValueDecoding { .. } => Level::MissingOptionalValue,
            Self::TypeMismatchDuringMerge { .. } => Level::Warning,
            _ => Level::Error,
        }
    }

    /// Path this error refers to, when it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::EmptyPath => None,
            Self::SourceLoadFailed { .. } => None,
            Self::EmptyElement { path }
            | Self::FailedToTokenizeElement { path, .. }
            | Self::UnableToParseName { path }
            | Self::InvalidArrayToken { path, .. }
            | Self::InvalidArrayNegativeIndexToken { path, .. }
            | Self::InvalidArrayIndexToken { path, .. }
            | Self::NoResultsFoundForNode { path, .. }
            | Self::NullNodeForPath { path }
            | Self::NoDecodersFound { path, .. }
            | Self::DecodingNumberFormat { path, .. }
            | Self::DecodingNumberParsing { path, .. }
            | Self::DecodingBoolean { path, .. }
            | Self::DecodingChar { path, .. }
            | Self::DecodingUuid { path, .. }
            | Self::DecodingDuration { path, .. }
            | Self::DecodingDateTime { path, .. }
            | Self::DecodingEnum { path, .. }
            | Self::DecodingLeafMissingValue { path, .. }
            | Self::DecodingArrayMissingValue { path, .. }
            | Self::DecodingExpectedLeafNodeType { path, .. }
            | Self::DecodingExpectedArrayNodeType { path, .. }
            | Self::DecodingExpectedMapNodeType { path, .. }
            | Self::ArrayMissingIndex { path, .. }
            | Self::MissingValueForNodePath { path, .. }
            | Self::OptionalMissingValueDecoding { path, .. }
            | Self::DecoderDepthExceeded { path, .. }
            | Self::FailedToConvertValue { path, .. }
            | Self::UnexpectedClosingTokenTransform { path, .. }
            | Self::UnclosedSubstitutionTransform { path, .. }
            | Self::SubstitutionDepthExceeded { path, .. }
            | Self::InvalidStringSubstitution { path, .. }
            | Self::UnknownTransform { path, .. }
            | Self::NoMatchingTransformFound { path, .. }
            | Self::NoEnvironmentVariableFound { path, .. }
            | Self::NoCustomMapValueFound { path, .. }
            | Self::FileTransformFailed { path, .. }
            | Self::Base64DecodeFailed { path, .. }
            | Self::InvalidRandomParameter { path, .. }
            | Self::TypeMismatchDuringMerge { path, .. }
            | Self::ConfigNodeImportMalformed { path, .. }
            | Self::ConfigNodeImportWrongNodeType { path, .. }
            | Self::ConfigNodeImportNodeEmpty { path }
            | Self::NoSourceFactoryFound { path, .. } => Some(path),
        }
    }
}
