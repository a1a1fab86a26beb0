pub mod handler;
pub mod msg_chat_handler;
pub mod msg_exec_handler;
pub mod msg_join_handler;
pub mod msg_mute_handler;
pub mod msg_ping_handler;
pub mod msg_state_handler;
