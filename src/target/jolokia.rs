//! JMX access through a Jolokia agent (HTTP/JSON bridge).
//!
//! The agent is attached to the target JVM and usually listens on port 8778.
//! Requests used:
//! - `GET  /version`: liveness check on open
//! - `POST {"type":"read","mbean":"java.lang:type=Runtime","attribute":"Name"}`:
//!   confirms on open that the agent runs inside the expected process
//! - `POST {"type":"list","path":...}`: attribute metadata of one bean
//! - `POST {"type":"read","mbean":...,"attribute":...}`: one attribute value

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::TargetConnection;
use crate::error::{MonitorError, Result};
use crate::model::{AttributeDescriptor, AttributeValue, ScalarValue};

/// Response envelope shared by every Jolokia request type.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    value: Value,
    status: u16,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
}

/// Per-attribute entry in a `list` response.
#[derive(Debug, Deserialize)]
struct ListedAttribute {
    #[serde(default = "default_readable")]
    readable: bool,
}

fn default_readable() -> bool {
    true
}

const RUNTIME_BEAN: &str = "java.lang:type=Runtime";

/// Blocking Jolokia client bound to one target process.
pub struct JolokiaConnection {
    endpoint: String,
    pid: u32,
    timeout: Duration,
    client: Option<Client>,
}

impl JolokiaConnection {
    /// Creates an unopened connection.
    ///
    /// # Arguments
    /// * `endpoint` - Agent base URL, e.g. `http://127.0.0.1:8778/jolokia`
    /// * `pid` - Process the agent must be attached to; checked on open
    /// * `timeout` - Per-request timeout
    pub fn new(endpoint: impl Into<String>, pid: u32, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            pid,
            timeout,
            client: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| MonitorError::Connection("connection is not open".to_string()))
    }

    fn post(&self, body: Value) -> Result<Envelope> {
        let response = self.client()?.post(&self.endpoint).json(&body).send()?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("agent returned status {}", status);
            return Err(match status.as_u16() {
                400 | 404 => MonitorError::NotFound(message),
                _ => MonitorError::Connection(message),
            });
        }

        let envelope: Envelope = response
            .json()
            .map_err(|e| MonitorError::Connection(format!("failed to parse response: {}", e)))?;
        check_status(envelope)
    }

    /// Fails unless the runtime name (`<pid>@<host>`) reports our pid.
    fn verify_pid(&self) -> Result<()> {
        let envelope = self.post(json!({
            "type": "read",
            "mbean": RUNTIME_BEAN,
            "attribute": "Name",
        }))?;
        let name = envelope.value.as_str().unwrap_or_default();

        match parse_runtime_pid(name) {
            Some(pid) if pid == self.pid => Ok(()),
            Some(pid) => Err(MonitorError::Connection(format!(
                "agent at {} belongs to pid {}, expected pid {}",
                self.endpoint, pid, self.pid
            ))),
            None => {
                warn!("Cannot verify pid {}: runtime name is {:?}", self.pid, name);
                Ok(())
            }
        }
    }
}

impl TargetConnection for JolokiaConnection {
    fn open(&mut self) -> Result<()> {
        let client = Client::builder().timeout(self.timeout).build()?;

        let url = format!("{}/version", self.endpoint);
        let response = client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(MonitorError::Connection(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }
        let envelope: Envelope = response
            .json()
            .map_err(|e| MonitorError::Connection(format!("failed to parse response: {}", e)))?;
        let envelope = check_status(envelope)?;
        debug!(
            "Agent version: {}",
            envelope.value.get("agent").unwrap_or(&serde_json::Value::Null)
        );

        self.client = Some(client);
        if let Err(e) = self.verify_pid() {
            self.client = None;
            return Err(match e {
                MonitorError::Connection(_) => e,
                other => MonitorError::Connection(format!(
                    "cannot verify pid {}: {}",
                    self.pid, other
                )),
            });
        }
        info!("Opened connection to pid {} via {}", self.pid, self.endpoint);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            info!("Bye");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn attribute_infos(&mut self, bean: &str) -> Result<Vec<AttributeDescriptor>> {
        let path = list_path(bean)?;
        let mut envelope = self.post(json!({ "type": "list", "path": path }))?;

        let attrs = match envelope.value.get_mut("attr").map(Value::take) {
            Some(Value::Object(map)) => map,
            // Beans without attributes omit the key.
            _ => return Ok(Vec::new()),
        };

        let mut descriptors = Vec::with_capacity(attrs.len());
        for (name, info) in attrs {
            let listed: ListedAttribute = serde_json::from_value(info).map_err(|e| {
                MonitorError::Connection(format!("bad metadata for {}#{}: {}", bean, name, e))
            })?;
            descriptors.push(AttributeDescriptor::new(bean, name, listed.readable));
        }
        Ok(descriptors)
    }

    fn read_attribute(&mut self, bean: &str, attribute: &str) -> Result<AttributeValue> {
        let envelope = self.post(json!({
            "type": "read",
            "mbean": bean,
            "attribute": attribute,
        }))?;
        Ok(to_attribute_value(envelope.value))
    }
}

impl Drop for JolokiaConnection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Maps a Jolokia error envelope to the matching error kind.
fn check_status(envelope: Envelope) -> Result<Envelope> {
    if envelope.status == 200 {
        return Ok(envelope);
    }

    let error_type = envelope.error_type.as_deref().unwrap_or_default();
    let message = envelope
        .error
        .clone()
        .unwrap_or_else(|| format!("status {}", envelope.status));

    let missing_bean = error_type.ends_with("InstanceNotFoundException")
        || error_type.ends_with("MalformedObjectNameException")
        || matches!(envelope.status, 400 | 404);

    if missing_bean {
        Err(MonitorError::NotFound(message))
    } else {
        Err(MonitorError::Connection(message))
    }
}

fn parse_runtime_pid(name: &str) -> Option<u32> {
    name.split_once('@').and_then(|(pid, _)| pid.parse().ok())
}

/// Builds the `list` path for a bean: `domain/key=value,...`.
///
/// `!` and `/` inside either part are escaped as `!!` and `!/`.
fn list_path(bean: &str) -> Result<String> {
    let (domain, properties) = bean
        .split_once(':')
        .filter(|(d, p)| !d.is_empty() && !p.is_empty())
        .ok_or_else(|| MonitorError::NotFound(format!("malformed bean name: {}", bean)))?;

    Ok(format!("{}/{}", escape_path(domain), escape_path(properties)))
}

fn escape_path(part: &str) -> String {
    part.replace('!', "!!").replace('/', "!/")
}

/// Converts a JSON attribute value into the crate's value model.
///
/// A top-level object is treated as composite data. Nested containers are
/// kept as compact JSON text.
fn to_attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Object(map) => AttributeValue::Structured(
            map.into_iter()
                .map(|(k, v)| (k, to_scalar(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
        other => AttributeValue::Scalar(to_scalar(other)),
    }
}

fn to_scalar(value: Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Bool(b) => ScalarValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ScalarValue::Integer(i)
            } else {
                ScalarValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => ScalarValue::Text(s),
        container => ScalarValue::Text(container.to_string()),
    }
}
