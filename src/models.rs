use serde::{Deserialize, Serialize};

/// One user's to-do entry. `todo_id` and `user_id` never change after
/// creation; the remaining fields are mutable through updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub todo_id: String,
    pub user_id: String,
    pub name: String,
    pub due_date: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

/// The mutable subset of a TodoItem. All three fields are overwritten on
/// every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachImageRequest {
    /// Object key for the upload. A fresh one is generated when absent.
    #[serde(default)]
    pub image_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListTodosResponse {
    pub todos: Vec<TodoItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoResponse {
    pub todo_item: TodoItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachImageResponse {
    pub image_url: String,
    pub signed_upload_url: String,
}
