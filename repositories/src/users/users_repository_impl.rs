use crate::users::{UsersRepository, UsersRepositoryError};
use anyhow::anyhow;
use async_trait::async_trait;
use model::user::User;
use rusoto_dynamodb::{AttributeValue, DynamoDb, PutItemInput};
use serde_dynamo::Error;
use std::collections::HashMap;

pub struct UsersRepositoryImpl<D: DynamoDb + Sync + Send> {
    table_name: String,
    dynamodb_client: D,
}

impl<D: DynamoDb + Sync + Send> UsersRepositoryImpl<D> {
    pub fn new(table_name: String, dynamodb_client: D) -> Self {
        Self {
            table_name,
            dynamodb_client,
        }
    }

    fn create_put_item_input(&self, user: &User) -> Result<PutItemInput, Error> {
        let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(user)?;

        Ok(PutItemInput {
            item,
            table_name: self.table_name.clone(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl<D: DynamoDb + Sync + Send> UsersRepository for UsersRepositoryImpl<D> {
    /// Writes the whole record with put semantics: an existing item under
    /// the same table key is fully replaced, never merged. The table's key
    /// schema is not inspected here; an item missing a required key
    /// attribute is rejected by DynamoDB at write time.
    async fn put_user(&self, user: User) -> Result<(), UsersRepositoryError> {
        let username = user.username.clone();

        let input = self.create_put_item_input(&user).map_err(|e| {
            UsersRepositoryError::Unknown(anyhow!(e).context(format!(
                "Error serializing user record for username {username}"
            )))
        })?;

        self.dynamodb_client.put_item(input).await.map_err(|e| {
            UsersRepositoryError::Unknown(
                anyhow!(e).context(format!("Failed to put user item for username {username}")),
            )
        })?;

        Ok(())
    }
}
