use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Generated-agent descriptor carried by `agent_generated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    /// Template name.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    /// Unix seconds.
    pub generated_at: i64,
}

/// One documentation write as reported to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocUpdate {
    /// `Created`, `Updated` or `Failed`.
    pub action: String,
    pub file: String,
    /// Short human description of the write.
    pub content: String,
    /// Name of the template that produced the write.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Success,
    Partial,
    Failed,
}

/// Status messages pushed to every registered listener, discriminated by
/// `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    ConnectionEstablished {
        client_id: String,
        message: String,
    },
    Pong {
        #[serde(default)]
        timestamp: Option<serde_json::Value>,
    },
    AgentGenerated {
        agent: AgentInfo,
    },
    DocumentationUpdated {
        update: DocUpdate,
    },
    WorkflowExecuted {
        workflow_id: String,
        execution_id: String,
    },
    LearningEvent {
        event_type: String,
        pattern: String,
        confidence: f64,
    },
    EventProcessed {
        pattern: String,
        status: ProcessStatus,
        files_written: usize,
        files_failed: usize,
    },
}

impl OutboundMessage {
    /// The `type` discriminator, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::ConnectionEstablished { .. } => "connection_established",
            OutboundMessage::Pong { .. } => "pong",
            OutboundMessage::AgentGenerated { .. } => "agent_generated",
            OutboundMessage::DocumentationUpdated { .. } => "documentation_updated",
            OutboundMessage::WorkflowExecuted { .. } => "workflow_executed",
            OutboundMessage::LearningEvent { .. } => "learning_event",
            OutboundMessage::EventProcessed { .. } => "event_processed",
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Messages a dashboard client may send, discriminated by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InboundMessage {
    TriggerDemo {
        scenario: String,
    },
    Ping {
        #[serde(default)]
        timestamp: Option<serde_json::Value>,
    },
}

impl InboundMessage {
    /// `None` for malformed JSON or an unknown action.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn agent_generated_wire_shape() {
        let msg = OutboundMessage::AgentGenerated {
            agent: AgentInfo {
                id: "security_specialist_1".into(),
                kind: "security_specialist".into(),
                name: "Security Specialist".into(),
                description: "Reviews auth changes".into(),
                capabilities: vec!["vulnerability_detection".into()],
                generated_at: 1_700_000_000,
            },
        };
        let v: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(v["type"], "agent_generated");
        assert_eq!(v["agent"]["type"], "security_specialist");
        assert_eq!(v["agent"]["generated_at"], 1_700_000_000);
        assert_eq!(msg.kind(), "agent_generated");
    }

    #[test]
    fn flat_messages_keep_fields_at_top_level() {
        let v = serde_json::to_value(OutboundMessage::LearningEvent {
            event_type: "pattern_recognized".into(),
            pattern: "sec:true|mvp:false|perf:false|err:false".into(),
            confidence: 1.0,
        })
        .unwrap();
        assert_eq!(
            v,
            json!({
                "type": "learning_event",
                "event_type": "pattern_recognized",
                "pattern": "sec:true|mvp:false|perf:false|err:false",
                "confidence": 1.0
            })
        );

        let v = serde_json::to_value(OutboundMessage::EventProcessed {
            pattern: "p".into(),
            status: ProcessStatus::Partial,
            files_written: 2,
            files_failed: 1,
        })
        .unwrap();
        assert_eq!(v["status"], "partial");
    }

    #[test]
    fn parses_inbound_actions() {
        assert_eq!(
            InboundMessage::parse(r#"{"action":"trigger_demo","scenario":"security"}"#),
            Some(InboundMessage::TriggerDemo {
                scenario: "security".into()
            })
        );
        assert_eq!(
            InboundMessage::parse(r#"{"action":"ping","timestamp":42}"#),
            Some(InboundMessage::Ping {
                timestamp: Some(json!(42))
            })
        );
        assert_eq!(InboundMessage::parse(r#"{"action":"dance"}"#), None);
        assert_eq!(InboundMessage::parse("not json"), None);
    }
}
