pub mod axis;
pub mod command;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod protocol;
pub mod protocol_client;
pub mod simulation;
pub mod socket_server;
