/// Event contracts for chat module wiring.
pub mod events;
pub mod message_input;
pub mod message_list;
pub mod project_link;
pub mod sidebar;
/// GPUI bridge over the conversation store.
pub mod state;

pub use events::{ConversationDeleteRequested, ConversationSelected, StoreChanged, Submit};
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use project_link::{LinkAction, LinkControl, LinkVariant, ProjectLink};
pub use sidebar::ChatSidebar;
pub use state::ChatState;
