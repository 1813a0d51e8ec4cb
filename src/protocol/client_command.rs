use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "send_command")]
    SendCommand {
        axis: String,
        command: String,
        #[serde(default)]
        value: Option<f64>,
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "get_all_axes")]
    GetAllAxes {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "get_system_status")]
    GetSystemStatus {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "list_axes")]
    ListAxes {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "ping")]
    Ping {
        #[serde(default)]
        id: Option<String>,
    },
}

impl ClientCommand {
    pub fn id(&self) -> Option<&String> {
        match self {
            ClientCommand::SendCommand { id, .. } => id.as_ref(),
            ClientCommand::GetAllAxes { id, .. } => id.as_ref(),
            ClientCommand::GetSystemStatus { id, .. } => id.as_ref(),
            ClientCommand::ListAxes { id, .. } => id.as_ref(),
            ClientCommand::Ping { id, .. } => id.as_ref(),
        }
    }
}
