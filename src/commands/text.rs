//! Reply texts sent back to users.

pub fn missing_parameters(command: &str) -> String {
    format!("Missing parameters for command: {command}")
}

pub fn invalid_parameter(command: &str, param: &str) -> String {
    format!("Command {command}: invalid value for parameter {param:?}")
}

pub fn access_denied(command: &str) -> String {
    format!("Sorry, the command {command:?} may only be run by administrators.")
}

pub const RESTRICTED: &str = "(restricted)";
pub const OPTIONAL: &str = "(optional)";
