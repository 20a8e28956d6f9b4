use ini::{Ini, ParseOption};
use std::path::Path;
use tracing::info;

use crate::error::CnfError;

/// Section of a MySQL option file that holds client credentials.
pub const CLIENT_SECTION: &str = "client";

/// Administrative credentials read from one option file. Absent keys are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub host: String,
    pub socket: String,
}

/// Turns a credential source into a [`Credential`].
pub trait CredentialParser {
    fn parse(&self, source: &Path) -> Result<Credential, CnfError>;
}

/// Reads the `[client]` section of a MySQL `.cnf` file.
pub struct IniCnfParser;

impl CredentialParser for IniCnfParser {
    fn parse(&self, source: &Path) -> Result<Credential, CnfError> {
        info!("reading credential file {}", source.display());

        if !source.exists() {
            return Err(CnfError::Missing(source.to_path_buf()));
        }

        // backslashes in passwords are literal
        let opts = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_file_opt(source, opts).map_err(|e| CnfError::Parse {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        let Some(client) = ini.section(Some(CLIENT_SECTION)) else {
            return Ok(Credential::default());
        };
        let field = |key: &str| client.get(key).unwrap_or_default().to_string();

        Ok(Credential {
            username: field("user"),
            password: field("password"),
            host: field("host"),
            socket: field("socket"),
        })
    }
}
