use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::cnf::CredentialParser;
use crate::drivers::{Connection, ConnectionTarget, Connector, ServerSession};
use crate::error::{CnfError, ConnectError, SnaplockError};

/// What happened to one credential source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Connected,
    Missing,
    Unparseable(String),
    Rejected(String),
    ConnectFailed(String),
    PingFailed(String),
}

impl From<&ConnectError> for Outcome {
    fn from(err: &ConnectError) -> Self {
        match err {
            ConnectError::Open { .. } | ConnectError::Version(_) => Outcome::ConnectFailed(err.to_string()),
            ConnectError::Ping(_) => Outcome::PingFailed(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

pub struct Resolved<S> {
    pub source: PathBuf,
    pub target: ConnectionTarget,
    pub connection: Connection<S>,
}

pub struct Resolution<S> {
    pub attempts: Vec<Attempt>,
    pub resolved: Option<Resolved<S>>,
}

impl<S> Resolution<S> {
    pub fn into_connection(self) -> Result<Resolved<S>, SnaplockError> {
        let tried = self.attempts.len();
        self.resolved.ok_or(SnaplockError::AuthExhausted { tried })
    }
}

/// Try `sources` in order and stop at the first one that yields a validated connection.
///
/// Every failure before that is logged and recorded; sources after it are never read.
pub fn resolve<P, C>(sources: &[PathBuf], parser: &P, connector: &C) -> Resolution<C::Session>
where
    P: CredentialParser,
    C: Connector,
{
    let mut attempts = Vec::new();

    for source in sources {
        let record = |attempts: &mut Vec<Attempt>, outcome: Outcome| {
            attempts.push(Attempt { source: source.clone(), outcome });
        };

        let cred = match parser.parse(source) {
            Ok(cred) => cred,
            Err(err @ CnfError::Missing(_)) => {
                error!("{}", err);
                record(&mut attempts, Outcome::Missing);
                continue;
            }
            Err(err @ CnfError::Parse { .. }) => {
                error!("{}", err);
                record(&mut attempts, Outcome::Unparseable(err.to_string()));
                continue;
            }
        };

        let target = match ConnectionTarget::from_credential(&cred) {
            Ok(target) => target,
            Err(why) => {
                error!("credential file {} not usable: {}", source.display(), why);
                record(&mut attempts, Outcome::Rejected(why.to_string()));
                continue;
            }
        };

        let mut session = match connector.connect(&target) {
            Ok(session) => session,
            Err(err) => {
                error!("{}", err);
                record(&mut attempts, Outcome::from(&err));
                continue;
            }
        };

        if let Err(err) = session.ping() {
            error!("{} ({})", err, target);
            record(&mut attempts, Outcome::from(&err));
            continue;
        }

        // an unreadable version only skips the engine log flush
        let version = match session.server_version() {
            Ok(version) => version,
            Err(err @ ConnectError::Version(_)) => {
                error!("{}", err);
                String::new()
            }
            Err(err) => {
                error!("{} ({})", err, target);
                record(&mut attempts, Outcome::from(&err));
                continue;
            }
        };
        info!("connected to {} (server {}) using {}", target, version, source.display());
        record(&mut attempts, Outcome::Connected);

        return Resolution {
            attempts,
            resolved: Some(Resolved {
                source: source.clone(),
                target,
                connection: Connection { session, version },
            }),
        };
    }

    Resolution { attempts, resolved: None }
}
