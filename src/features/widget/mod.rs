//! 后台组件实例：组件目录、实例模型与持久化、校验/保存动作。

pub mod catalog;
pub mod handler;
pub mod messages;
pub mod model;
pub mod storage;

pub use catalog::{WidgetCatalog, WidgetDefinition};
pub use handler::create_widget_router;
pub use messages::{MessageCollection, MessageType, MessagesBlock};
pub use model::{ValidateResponse, WidgetInstance};
pub use storage::WidgetStorage;
