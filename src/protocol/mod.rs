pub mod client_command;
pub mod error;
pub mod server_response;

use client_command::ClientCommand;
use error::ProtocolError;
use server_response::ServerResponse;

pub fn parse_command(json_str: &str) -> Result<ClientCommand, ProtocolError> {
    serde_json::from_str(json_str).map_err(ProtocolError::from)
}

pub fn serialize_response(response: &ServerResponse) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(ProtocolError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::error::GatewayError;

    #[test]
    fn test_parse_send_command() {
        let json = r#"{"type": "send_command", "axis": "axis1", "command": "moveTo", "value": 42.0, "id": "req-1"}"#;
        let cmd = parse_command(json).unwrap();

        assert_eq!(cmd.id().map(String::as_str), Some("req-1"));
        match cmd {
            ClientCommand::SendCommand {
                axis,
                command,
                value,
                ..
            } => {
                assert_eq!(axis, "axis1");
                assert_eq!(command, "moveTo");
                assert_eq!(value, Some(42.0));
            }
            _ => panic!("Expected SendCommand"),
        }
    }

    #[test]
    fn test_value_is_optional() {
        let json = r#"{"type": "send_command", "axis": "axis2", "command": "home"}"#;
        match parse_command(json).unwrap() {
            ClientCommand::SendCommand { value, id, .. } => {
                assert_eq!(value, None);
                assert_eq!(id, None);
            }
            _ => panic!("Expected SendCommand"),
        }
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let err = parse_command(r#"{"type": "teleport"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidJson(_)));
    }

    #[test]
    fn test_serialize_success_response() {
        let response = ServerResponse::success(
            Some("test-id".to_string()),
            serde_json::json!({"result": "ok"}),
        );

        let json = serialize_response(&response).unwrap();
        assert!(json.contains("success"));
        assert!(json.contains("test-id"));
    }

    #[test]
    fn test_serialize_rejected_response() {
        let response = ServerResponse::rejected(None, &GatewayError::UnknownAxis("axis9".into()));

        let json = serialize_response(&response).unwrap();
        assert!(json.contains(r#""status":"error""#));
        assert!(json.contains("unknown_axis"));
        assert!(json.contains("axis9"));
        assert!(!json.contains(r#""id""#));
    }
}
