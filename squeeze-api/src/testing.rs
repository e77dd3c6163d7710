//! Test utilities
//!
//! [`StubTransport`] records every command it receives and answers from a
//! table of canned replies keyed by leading command tokens. Enable the
//! `test-support` feature to use it from other crates.

use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::command::Command;
use crate::device::DeviceId;
use crate::error::{ApiError, Result};
use crate::transport::Transport;

/// A command received by [`StubTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub device: DeviceId,
    pub tokens: Vec<Value>,
}

impl RecordedCall {
    /// Tokens joined with spaces, e.g. `"mixer volume 50"`
    pub fn command_line(&self) -> String {
        self.tokens
            .iter()
            .map(|t| match t {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
enum Canned {
    Reply(Value),
    Fail(String),
}

#[derive(Debug)]
struct Rule {
    prefix: Vec<String>,
    canned: Canned,
    once: bool,
}

/// A recording transport with canned replies
///
/// Rules are checked in the order they were added; the first whose prefix
/// matches the leading tokens of a command answers it. One-shot rules are
/// discarded after answering. Commands matching no rule get an empty object.
#[derive(Debug, Default)]
pub struct StubTransport {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command starting with `prefix` with `result`
    pub fn reply(&self, prefix: &str, result: Value) {
        self.push(prefix, Canned::Reply(result), false);
    }

    /// Answer the next command starting with `prefix` with `result`
    pub fn reply_once(&self, prefix: &str, result: Value) {
        self.push(prefix, Canned::Reply(result), true);
    }

    /// Fail every command starting with `prefix` with a network error
    pub fn fail(&self, prefix: &str, message: &str) {
        self.push(prefix, Canned::Fail(message.to_string()), false);
    }

    /// Fail the next command starting with `prefix` with a network error
    pub fn fail_once(&self, prefix: &str, message: &str) {
        self.push(prefix, Canned::Fail(message.to_string()), true);
    }

    /// Every command received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls().pop()
    }

    /// Commands received so far as space-joined lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::command_line).collect()
    }

    fn push(&self, prefix: &str, canned: Canned, once: bool) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push(Rule {
                prefix: prefix.split_whitespace().map(str::to_string).collect(),
                canned,
                once,
            });
        }
    }

    fn answer(&self, tokens: &[String]) -> Canned {
        let Ok(mut rules) = self.rules.lock() else {
            return Canned::Reply(Value::Object(Map::new()));
        };

        let matched = rules.iter().position(|rule| {
            rule.prefix.len() <= tokens.len()
                && rule.prefix.iter().zip(tokens).all(|(p, t)| p == t)
        });

        match matched {
            Some(index) if rules[index].once => rules.remove(index).canned,
            Some(index) => rules[index].canned.clone(),
            None => Canned::Reply(Value::Object(Map::new())),
        }
    }
}

impl Transport for StubTransport {
    fn request(&self, device: &DeviceId, command: &Command) -> Result<Value> {
        let call = RecordedCall {
            device: device.clone(),
            tokens: command.to_values(),
        };
        let tokens: Vec<String> = command.tokens().iter().map(|t| t.to_string()).collect();

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        match self.answer(&tokens) {
            Canned::Reply(value) => Ok(value),
            Canned::Fail(message) => Err(ApiError::NetworkError(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_matching_is_token_wise() {
        let stub = StubTransport::new();
        stub.reply("player", json!({"which": "player"}));
        stub.reply("players", json!({"which": "players"}));

        let device = DeviceId::broadcast();
        let reply = stub.request(&device, &Command::from_tokens(["players", "0", "1000"])).unwrap();
        assert_eq!(reply, json!({"which": "players"}));

        let reply = stub.request(&device, &Command::from_tokens(["player", "count", "?"])).unwrap();
        assert_eq!(reply, json!({"which": "player"}));
    }

    #[test]
    fn test_one_shot_rules_are_consumed() {
        let stub = StubTransport::new();
        stub.reply_once("status", json!({"n": 1}));
        stub.reply("status", json!({"n": 2}));

        let device = DeviceId::new("aa");
        let status = Command::new("status");
        assert_eq!(stub.request(&device, &status).unwrap(), json!({"n": 1}));
        assert_eq!(stub.request(&device, &status).unwrap(), json!({"n": 2}));
        assert_eq!(stub.command_lines(), vec!["status", "status"]);
    }

    #[test]
    fn test_unmatched_commands_get_empty_object() {
        let stub = StubTransport::new();
        let reply = stub.request(&DeviceId::new("aa"), &Command::new("stop")).unwrap();
        assert_eq!(reply, json!({}));
    }
}
