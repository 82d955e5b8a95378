use crate::command::Command;

#[derive(Debug, Clone)]
pub enum SimEvent {
    Command(Command),
    /// The script or stdin ran out of lines.
    InputClosed,
}
