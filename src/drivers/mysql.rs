use anyhow::Result;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};

use super::{Address, ConnectionTarget, Connector, ServerSession};
use crate::error::ConnectError;

pub struct MySqlConnector;

pub struct MySqlSession {
    conn: Conn,
}

impl Connector for MySqlConnector {
    type Session = MySqlSession;

    fn connect(&self, target: &ConnectionTarget) -> Result<MySqlSession, ConnectError> {
        let opts = OptsBuilder::new()
            .user(Some(target.user.as_str()))
            .pass(Some(target.password.as_str()));
        let opts = match &target.address {
            Address::Socket(path) => opts.socket(Some(path.to_string_lossy().into_owned())),
            Address::Tcp { host, port } => opts
                .ip_or_hostname(Some(host.as_str()))
                .tcp_port(*port)
                .prefer_socket(false),
        };
        let conn = Conn::new(opts).map_err(|e| ConnectError::Open {
            target: target.to_string(),
            reason: e.to_string(),
        })?;
        Ok(MySqlSession { conn })
    }
}

impl ServerSession for MySqlSession {
    fn execute(&mut self, statement: &str) -> Result<()> {
        self.conn.query_drop(statement)?;
        Ok(())
    }

    fn ping(&mut self) -> Result<(), ConnectError> {
        self.conn.ping().map_err(|e| ConnectError::Ping(e.to_string()))
    }

    fn server_version(&mut self) -> Result<String, ConnectError> {
        let version: Option<String> = self
            .conn
            .query_first("SELECT VERSION()")
            .map_err(|e| ConnectError::Version(e.to_string()))?;
        Ok(version.unwrap_or_default())
    }
}
