//! Parsing logic for a separate vault config file

use std::fs;

use clap::Parser;
use toml::{Value, map::Map};

use crate::{Cli, VaultConfig, parsing::parse_config_from_args};

/// The CLI argument name for the config file
const CONFIG_FILE_ARG: &str = "--config-file";

/// Parse args from a config file
pub(crate) fn config_file_args(cli_args: &[String]) -> Result<Vec<String>, String> {
    // If we find "--config-file", the next argument is the file to read from
    let path_index = match cli_args.iter().position(|arg| arg == CONFIG_FILE_ARG) {
        Some(index) => index + 1,
        None => return Ok(vec![]),
    };

    let path = cli_args
        .get(path_index)
        .ok_or_else(|| format!("`{CONFIG_FILE_ARG}` requires a path"))?;
    read_config_file(path)
}

/// Parse a config entirely from a file
pub fn parse_config_from_file(path: &str) -> Result<VaultConfig, String> {
    let mut file_args = read_config_file(path)?;
    file_args.insert(0, "dummy-program-name".to_string());
    let cli = Cli::try_parse_from(file_args).map_err(|e| e.to_string())?;
    parse_config_from_args(cli)
}

/// Parse a config file
fn read_config_file(path: &str) -> Result<Vec<String>, String> {
    // Read in the config file
    let file_contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let config_kv_pairs: Map<_, _> =
        toml::from_str(&file_contents).map_err(|err| err.to_string())?;

    let mut config_file_args: Vec<String> = Vec::with_capacity(config_kv_pairs.len());
    for (toml_key, value) in config_kv_pairs.iter() {
        // Format the TOML key into --key
        let cli_arg = format!("--{}", toml_key);
        let cli_values = parse_toml_value(cli_arg, value)?;
        config_file_args.extend(cli_values);
    }

    Ok(config_file_args)
}

// ----------------
// | TOML Parsing |
// ----------------

/// Parse a toml value into a list of strings to append to the CLI args
fn parse_toml_value(cli_arg: String, val: &Value) -> Result<Vec<String>, String> {
    let values: Vec<String> = match val {
        Value::Boolean(b) => toml_boolean_to_args(cli_arg, *b),
        Value::Array(arr) => toml_array_to_args(&cli_arg, arr)?,
        Value::Table(_) => return Err(format!("{cli_arg}: nested tables are not supported")),
        x => toml_value_to_args(cli_arg, x)?,
    };

    Ok(values)
}

/// Parse a toml boolean into a string that is CLI compatible
///
/// This will be "--key" if the boolean is true, otherwise it will be empty
fn toml_boolean_to_args(cli_arg: String, b: bool) -> Vec<String> {
    if b { vec![cli_arg] } else { vec![] }
}

/// Parse a toml array into a string that is CLI compatible
///
/// This will be "--arg val1 --arg val2 --arg val3"
fn toml_array_to_args(cli_arg: &str, arr: &[Value]) -> Result<Vec<String>, String> {
    let mut res: Vec<String> = Vec::new();
    for val in arr.iter() {
        res.push(cli_arg.to_string());
        res.push(toml_value_to_string(val)?);
    }

    Ok(res)
}

/// Parse a toml value into a string that is CLI compatible
fn toml_value_to_args(cli_arg: String, val: &Value) -> Result<Vec<String>, String> {
    let value_str = toml_value_to_string(val)?;
    Ok(vec![cli_arg, value_str])
}

/// Helper method to convert a toml value to a string
fn toml_value_to_string(val: &Value) -> Result<String, String> {
    Ok(match val {
        Value::String(val) => val.clone(),
        Value::Integer(val) => format!("{:?}", val),
        Value::Float(val) => format!("{:?}", val),
        Value::Boolean(val) => format!("{:?}", val),
        _ => {
            return Err("unsupported value".to_string());
        },
    })
}
