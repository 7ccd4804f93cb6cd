use std::{collections::BTreeMap, process::Command};

use serde::de::{
    self, DeserializeOwned, IntoDeserializer, Unexpected, Visitor,
    value::{self, MapDeserializer},
};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

pub trait EnvVars {
    const PREFIX: &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("failed to encode {prefix}* environment variables")]
    Encode {
        prefix: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {prefix}* environment variables")]
    Decode {
        prefix: &'static str,
        #[source]
        source: value::Error,
    },

    #[error("environment variable {name} is not valid unicode")]
    NotUnicode { name: String },
}

/// Variables exported to the interpreter process.
#[derive(Debug, Serialize)]
pub struct InterpreterVars {
    /// Encoding used for the interpreter's stdin, stdout and stderr.
    pub ioencoding: String,
}

impl Default for InterpreterVars {
    fn default() -> Self {
        Self {
            ioencoding: "utf-8".to_string(),
        }
    }
}

impl EnvVars for InterpreterVars {
    const PREFIX: &'static str = "PYTHON";
}

/// Overrides read from the launcher's own environment.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LauncherVars {
    /// File name of the interpreter, resolved next to the launcher binary.
    pub interpreter: Option<String>,

    /// Exit with the interpreter's exit code instead of 0.
    pub propagate_exit_code: bool,

    /// `tracing` filter directives for the launcher's own logs.
    pub log: Option<String>,
}

impl EnvVars for LauncherVars {
    const PREFIX: &'static str = "PYTHON3_UTF8_";
}

pub trait CommandExt {
    fn with_env_vars(
        &mut self,
        vars: impl EnvVars + serde::Serialize,
    ) -> Result<&mut Self, EnvError>;
}

impl CommandExt for Command {
    fn with_env_vars(
        &mut self,
        vars: impl EnvVars + serde::Serialize,
    ) -> Result<&mut Self, EnvError> {
        self.envs(serialize_prefixed(vars)?);
        Ok(self)
    }
}

pub fn deserialize_from_env<T: DeserializeOwned + EnvVars>() -> Result<T, EnvError> {
    let vars = std::env::vars_os()
        .filter_map(|(k, v)| {
            let k = k.into_string().ok()?;
            k.starts_with(T::PREFIX).then_some((k, v))
        })
        .map(|(k, v)| match v.into_string() {
            Ok(v) => Ok((k, v)),
            Err(_) => Err(EnvError::NotUnicode { name: k }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    deserialize_prefixed(vars)
}

/// Decodes `T` from `(name, value)` pairs, keeping only names that carry `T::PREFIX`.
///
/// Values are decoded as the field they land in asks for: booleans and numbers are
/// parsed from the text, strings and options take the text as is.
pub fn deserialize_prefixed<T: DeserializeOwned + EnvVars>(
    input: impl IntoIterator<Item = (String, String)>,
) -> Result<T, EnvError> {
    let fields = input.into_iter().filter_map(|(k, v)| {
        let field = k.strip_prefix(T::PREFIX)?.to_ascii_lowercase();
        Some((field, EnvValue(v)))
    });

    T::deserialize(MapDeserializer::<_, value::Error>::new(fields)).map_err(|source| {
        EnvError::Decode {
            prefix: T::PREFIX,
            source,
        }
    })
}

pub fn serialize<T: serde::Serialize>(
    input: T,
) -> Result<BTreeMap<String, String>, serde_json::Error> {
    let value = serde_json::to_value(input)?;
    let map: BTreeMap<String, Value> = serde_json::from_value(value)?;

    let serialized_map = map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect();

    Ok(serialized_map)
}

/// Encodes `data` into fully qualified `(name, value)` pairs, e.g. `PYTHONIOENCODING=utf-8`.
pub fn serialize_prefixed<T: serde::Serialize + EnvVars>(
    data: T,
) -> Result<Vec<(String, String)>, EnvError> {
    let map = serialize(data).map_err(|source| EnvError::Encode {
        prefix: T::PREFIX,
        source,
    })?;

    Ok(map
        .into_iter()
        .map(|(k, v)| (format!("{}{}", T::PREFIX, k.to_ascii_uppercase()), v))
        .collect())
}

/// The raw text of one environment variable.
struct EnvValue(String);

macro_rules! deserialize_parsed {
    ($de:lifetime; $($method:ident => $visit:ident,)*) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                match self.0.parse() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => Err(de::Error::invalid_value(Unexpected::Str(&self.0), &visitor)),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for EnvValue {
    type Error = value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_string(self.0)
    }

    deserialize_parsed! { 'de;
        deserialize_bool => visit_bool,
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
    }

    // A set variable is always `Some`, even when it reads `null`.
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_enum(self.0.into_deserializer())
    }

    serde::forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, value::Error> for EnvValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}
