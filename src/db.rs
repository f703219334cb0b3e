use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{TodoItem, TodoUpdate};

/// Sole mediator between handlers and the items table. Handlers never touch
/// the DynamoDB client directly; tests substitute an in-memory store.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All items owned by `user_id`, via the user-id index. Order is
    /// whatever the index yields.
    async fn list_items_for_user(&self, user_id: &str) -> Result<Vec<TodoItem>, ApiError>;

    /// Unconditional put. Callers generate a fresh todo id per create, so a
    /// key collision means last-writer-wins by contract.
    async fn create_item(&self, item: TodoItem) -> Result<TodoItem, ApiError>;

    /// Overwrites exactly the three mutable fields. Fails with `NotFound`
    /// when the id does not exist; never creates a sparse record.
    async fn update_item(&self, todo_id: &str, update: TodoUpdate)
        -> Result<TodoUpdate, ApiError>;

    /// Unconditional delete. Deleting a missing id is a no-op success.
    async fn delete_item(&self, todo_id: &str) -> Result<(), ApiError>;

    /// Writes the item's attachment URL. Same `NotFound` rule as update.
    async fn set_attachment_url(&self, todo_id: &str, url: &str) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DynamoStore {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if config.is_offline {
            tracing::info!("IS_OFFLINE set, targeting local DynamoDB");
            loader = loader
                .endpoint_url("http://localhost:8000")
                .region(aws_config::Region::new("localhost"));
        }

        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
            table_name: config.table_name.clone(),
            index_name: config.index_name.clone(),
        }
    }
}

#[async_trait]
impl TodoStore for DynamoStore {
    async fn list_items_for_user(&self, user_id: &str) -> Result<Vec<TodoItem>, ApiError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.index_name)
            .key_condition_expression("userId = :userId")
            .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;

        let todos = result.items().iter().filter_map(item_to_todo).collect();

        Ok(todos)
    }

    async fn create_item(&self, item: TodoItem) -> Result<TodoItem, ApiError> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("todoId", AttributeValue::S(item.todo_id.clone()))
            .item("userId", AttributeValue::S(item.user_id.clone()))
            .item("name", AttributeValue::S(item.name.clone()))
            .item("dueDate", AttributeValue::S(item.due_date.clone()))
            .item("done", AttributeValue::Bool(item.done));

        if let Some(url) = &item.attachment_url {
            request = request.item("attachmentUrl", AttributeValue::S(url.clone()));
        }

        request
            .send()
            .await
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;

        Ok(item)
    }

    async fn update_item(
        &self,
        todo_id: &str,
        update: TodoUpdate,
    ) -> Result<TodoUpdate, ApiError> {
        // "name" is a DynamoDB reserved word, hence the attribute alias.
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("todoId", AttributeValue::S(todo_id.to_string()))
            .condition_expression("attribute_exists(todoId)")
            .update_expression("SET #name = :name, dueDate = :dueDate, done = :done")
            .expression_attribute_names("#name", "name")
            .expression_attribute_values(":name", AttributeValue::S(update.name.clone()))
            .expression_attribute_values(":dueDate", AttributeValue::S(update.due_date.clone()))
            .expression_attribute_values(":done", AttributeValue::Bool(update.done))
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_conditional_check_failed_exception() => ApiError::NotFound,
                _ => ApiError::StoreUnavailable(e.to_string()),
            })?;

        Ok(update)
    }

    async fn delete_item(&self, todo_id: &str) -> Result<(), ApiError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("todoId", AttributeValue::S(todo_id.to_string()))
            .send()
            .await
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn set_attachment_url(&self, todo_id: &str, url: &str) -> Result<(), ApiError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("todoId", AttributeValue::S(todo_id.to_string()))
            .condition_expression("attribute_exists(todoId)")
            .update_expression("SET attachmentUrl = :url")
            .expression_attribute_values(":url", AttributeValue::S(url.to_string()))
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_conditional_check_failed_exception() => ApiError::NotFound,
                _ => ApiError::StoreUnavailable(e.to_string()),
            })?;

        Ok(())
    }
}

fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Option<TodoItem> {
    Some(TodoItem {
        todo_id: item.get("todoId")?.as_s().ok()?.clone(),
        user_id: item.get("userId")?.as_s().ok()?.clone(),
        name: item.get("name")?.as_s().ok()?.clone(),
        due_date: item.get("dueDate")?.as_s().ok()?.clone(),
        done: *item.get("done")?.as_bool().ok()?,
        attachment_url: item.get("attachmentUrl").and_then(|v| v.as_s().ok()).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("todoId".to_string(), AttributeValue::S("t1".to_string())),
            ("userId".to_string(), AttributeValue::S("u1".to_string())),
            ("name".to_string(), AttributeValue::S("Buy milk".to_string())),
            (
                "dueDate".to_string(),
                AttributeValue::S("2024-01-01".to_string()),
            ),
            ("done".to_string(), AttributeValue::Bool(false)),
        ])
    }

    #[test]
    fn maps_item_without_attachment() {
        let todo = item_to_todo(&sample_item()).unwrap();
        assert_eq!(todo.todo_id, "t1");
        assert_eq!(todo.user_id, "u1");
        assert_eq!(todo.name, "Buy milk");
        assert_eq!(todo.due_date, "2024-01-01");
        assert!(!todo.done);
        assert!(todo.attachment_url.is_none());
    }

    #[test]
    fn maps_attachment_url_when_present() {
        let mut item = sample_item();
        item.insert(
            "attachmentUrl".to_string(),
            AttributeValue::S("https://b.s3.amazonaws.com/img".to_string()),
        );
        let todo = item_to_todo(&item).unwrap();
        assert_eq!(
            todo.attachment_url.as_deref(),
            Some("https://b.s3.amazonaws.com/img")
        );
    }

    #[test]
    fn skips_items_missing_required_attributes() {
        let mut item = sample_item();
        item.remove("name");
        assert!(item_to_todo(&item).is_none());
    }
}
