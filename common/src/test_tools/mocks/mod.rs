pub mod dynamodb_client;
