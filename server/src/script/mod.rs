mod context;
mod events;
mod hooks;
mod registry;
mod script;

pub use context::{ScriptAction, ScriptContext};
pub use events::{
    ActivateEvent, CreateEvent, DeathEvent, EnterRangeEvent, ExecuteEvent, ObjectiveUpdateEvent,
    QuestStateEvent,
};
pub use hooks::{HookKind, HookSet};
pub use registry::ScriptRegistry;
pub use script::ContentScript;
