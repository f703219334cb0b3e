use lambda_http::{Body, Request, Response};
use uuid::Uuid;

use crate::db::TodoStore;
use crate::error::ApiError;
use crate::models::{
    AttachImageRequest, AttachImageResponse, CreateTodoRequest, CreateTodoResponse,
    ListTodosResponse, TodoItem, TodoUpdate,
};
use crate::storage::UploadStore;

fn json_response(status: u16, body: &impl serde::Serialize) -> Result<Response<Body>, ApiError> {
    let json = serde_json::to_string(body).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(json))
        .unwrap())
}

fn parse_body<T: serde::de::DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    match req.body() {
        Body::Text(s) => Ok(serde_json::from_str(s)?),
        Body::Binary(b) => Ok(serde_json::from_slice(b)?),
        Body::Empty => Err(ApiError::BadRequest("Empty body".to_string())),
    }
}

pub async fn list_todos(
    store: &dyn TodoStore,
    user_id: &str,
) -> Result<Response<Body>, ApiError> {
    let todos = store.list_items_for_user(user_id).await?;
    json_response(200, &ListTodosResponse { todos })
}

pub async fn create_todo(
    req: Request,
    store: &dyn TodoStore,
    user_id: &str,
) -> Result<Response<Body>, ApiError> {
    let input: CreateTodoRequest = parse_body(&req)?;

    if input.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }

    let item = TodoItem {
        todo_id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: input.name,
        due_date: input.due_date,
        done: input.done,
        attachment_url: None,
    };

    let todo_item = store.create_item(item).await?;
    json_response(200, &CreateTodoResponse { todo_item })
}

pub async fn update_todo(
    req: Request,
    store: &dyn TodoStore,
    todo_id: &str,
) -> Result<Response<Body>, ApiError> {
    let update: TodoUpdate = parse_body(&req)?;

    if update.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }

    let applied = store.update_item(todo_id, update).await?;
    json_response(200, &applied)
}

pub async fn delete_todo(
    store: &dyn TodoStore,
    todo_id: &str,
) -> Result<Response<Body>, ApiError> {
    store.delete_item(todo_id).await?;
    Ok(Response::builder().status(200).body(Body::Empty).unwrap())
}

pub async fn attach_image(
    req: Request,
    store: &dyn TodoStore,
    uploads: &dyn UploadStore,
    todo_id: &str,
) -> Result<Response<Body>, ApiError> {
    let image_id = match req.body() {
        Body::Empty => None,
        _ => parse_body::<AttachImageRequest>(&req)?.image_id,
    }
    .unwrap_or_else(|| Uuid::new_v4().to_string());

    let signed_upload_url = uploads.signed_upload_url(&image_id).await?;
    let image_url = uploads.public_url(&image_id);

    // The row points at the object before the client has uploaded anything;
    // the URL is where the image will land, not proof that it exists.
    store.set_attachment_url(todo_id, &image_url).await?;

    json_response(
        200,
        &AttachImageResponse {
            image_url,
            signed_upload_url,
        },
    )
}
