mod building;
#[cfg(feature = "serde_json-1")]
mod extjson;
mod reading;
mod scalars;
