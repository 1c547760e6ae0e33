use anyhow::anyhow;
use async_trait::async_trait;
use aws_lambda_events::event::s3::S3Event;
use common::aws_clients::dynamodb::get_dynamodb_client;
use common::aws_clients::s3::get_s3_client;
use model::user::User;
use repositories::users::users_repository_impl::UsersRepositoryImpl;
use repositories::users::UsersRepository;
use std::sync::Arc;
use user_ingest::blobs::s3_blob_fetcher::S3BlobFetcher;
use user_ingest::blobs::BlobFetcher;
use user_ingest::events::s3::ObjectLocation;
use user_ingest::{
    lambda_main, lambda_structure::lambda_trait::Lambda, result::error::LambdaError,
};

const USERS_TABLE_NAME: &str = "users";

type BlobFetcherObject = Arc<dyn BlobFetcher + Sync + Send>;

pub struct Persisted {
    pub users_repository: Arc<dyn UsersRepository>,
    pub blob_fetcher: BlobFetcherObject,
}

pub struct S3UserLoader;

impl S3UserLoader {
    /// Fetches one uploaded object, parses it as a JSON array of user
    /// records and writes every record into the users table, in order.
    /// Writes are not transactional: a failure leaves earlier records
    /// durably written and later ones never attempted.
    async fn load_object(location: &ObjectLocation, state: &Persisted) -> Result<(), LambdaError> {
        let bytes = state
            .blob_fetcher
            .fetch(&location.bucket, &location.key)
            .await?;

        let body = String::from_utf8(bytes).map_err(|e| {
            LambdaError::Unknown(anyhow!(e).context("Object body is not valid UTF-8"))
        })?;

        let users: Vec<User> = serde_json::from_str(&body).map_err(|e| {
            LambdaError::Unknown(
                anyhow!(e).context("Object body is not a JSON array of user records"),
            )
        })?;

        for user in users {
            tracing::info!(
                username = %user.username,
                role = %user.role,
                "Adding user item username:{}, role:{}",
                user.username,
                user.role
            );

            state
                .users_repository
                .put_user(user)
                .await
                .map_err(|e| LambdaError::Unknown(anyhow!(e)))?;
        }

        Ok(())
    }
}

#[async_trait]
impl Lambda for S3UserLoader {
    type PersistedMemory = Persisted;
    type InputBody = S3Event;
    type Output = ();
    type Error = LambdaError;

    async fn bootstrap() -> Result<Self::PersistedMemory, Self::Error> {
        tracing::info!("Initializing shared AWS clients");

        let users_repository = Arc::new(UsersRepositoryImpl::new(
            USERS_TABLE_NAME.to_owned(),
            get_dynamodb_client(),
        ));
        let blob_fetcher = Arc::new(S3BlobFetcher::new(get_s3_client()));

        Ok(Persisted {
            users_repository,
            blob_fetcher,
        })
    }

    async fn run(
        request: Self::InputBody,
        state: &Self::PersistedMemory,
    ) -> Result<Self::Output, Self::Error> {
        // Notifications usually carry a single record, but nothing in the
        // contract forbids more. An empty batch is a successful no-op.
        for record in &request.records {
            let location = ObjectLocation::try_from(record).map_err(LambdaError::Unknown)?;

            if let Err(e) = Self::load_object(&location, state).await {
                tracing::error!(
                    bucket = %location.bucket,
                    key = %location.key,
                    error = ?e,
                    "Error loading object {} from bucket {}. Make sure they exist and the bucket is in the same region as this function.",
                    location.key,
                    location.bucket
                );
                return Err(e);
            }
        }

        Ok(())
    }
}

lambda_main!(S3UserLoader);

#[cfg(test)]
mod tests {
    use crate::{Persisted, S3UserLoader};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use aws_lambda_events::event::s3::S3Event;
    use common::test_tools::constants::{
        BUCKET_FOR_MOCK_REQUESTS, DECODED_KEY_FOR_MOCK_REQUESTS, ENCODED_KEY_FOR_MOCK_REQUESTS,
        KEY_FOR_MOCK_REQUESTS,
    };
    use mockall::predicate::eq;
    use mockall::{mock, Sequence};
    use model::user::User;
    use repositories::users::{MockUsersRepository, UsersRepositoryError};
    use rstest::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use user_ingest::blobs::{BlobFetcher, BlobFetcherError};
    use user_ingest::lambda_structure::lambda_trait::Lambda;
    use user_ingest::result::error::LambdaError;

    mock! {
        Fetcher {}
        #[async_trait]
        impl BlobFetcher for Fetcher {
            async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobFetcherError>;
        }
    }

    struct TestFixture {
        pub users_repository: MockUsersRepository,
        pub blob_fetcher: MockFetcher,
    }

    #[fixture]
    fn fixture() -> TestFixture {
        TestFixture {
            users_repository: MockUsersRepository::new(),
            blob_fetcher: MockFetcher::new(),
        }
    }

    fn persisted(fixture: TestFixture) -> Persisted {
        Persisted {
            users_repository: Arc::new(fixture.users_repository),
            blob_fetcher: Arc::new(fixture.blob_fetcher),
        }
    }

    fn record_json(bucket: &str, key: Value) -> Value {
        json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-west-2",
            "eventTime": "2024-01-15T00:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "userIdentity": { "principalId": "AWS:EXAMPLE" },
            "requestParameters": { "sourceIPAddress": "127.0.0.1" },
            "responseElements": {
                "x-amz-request-id": "C3D13FE58DE4C810",
                "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "testConfigRule",
                "bucket": {
                    "name": bucket,
                    "ownerIdentity": { "principalId": "EXAMPLE" },
                    "arn": format!("arn:aws:s3:::{bucket}")
                },
                "object": {
                    "key": key,
                    "size": 1024,
                    "eTag": "0123456789abcdef0123456789abcdef",
                    "sequencer": "0A1B2C3D4E5F678901"
                }
            }
        })
    }

    fn s3_event(bucket: &str, key: &str) -> S3Event {
        serde_json::from_value(json!({ "Records": [record_json(bucket, json!(key))] }))
            .expect("valid S3 event")
    }

    fn user(username: &str, role: &str) -> User {
        User::new(username, role)
    }

    #[rstest]
    #[tokio::test]
    async fn writes_every_record_in_order(mut fixture: TestFixture) {
        let body = r#"[{"username":"alice","role":"admin"},{"username":"bob","role":"editor"}]"#;
        fixture
            .blob_fetcher
            .expect_fetch()
            .withf(|bucket, key| bucket == BUCKET_FOR_MOCK_REQUESTS && key == KEY_FOR_MOCK_REQUESTS)
            .once()
            .returning(move |_, _| Ok(body.as_bytes().to_vec()));

        let mut seq = Sequence::new();
        fixture
            .users_repository
            .expect_put_user()
            .with(eq(user("alice", "admin")))
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        fixture
            .users_repository
            .expect_put_user()
            .with(eq(user("bob", "editor")))
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .expect("should succeed");
    }

    #[rstest]
    #[tokio::test]
    async fn url_encoded_key_is_decoded_before_the_fetch(mut fixture: TestFixture) {
        let body = r#"[{"username":"alice","role":"admin"},{"username":"bob","role":"editor"}]"#;
        fixture
            .blob_fetcher
            .expect_fetch()
            .withf(|bucket, key| {
                bucket == BUCKET_FOR_MOCK_REQUESTS && key == DECODED_KEY_FOR_MOCK_REQUESTS
            })
            .once()
            .returning(move |_, _| Ok(body.as_bytes().to_vec()));

        fixture
            .users_repository
            .expect_put_user()
            .times(2)
            .returning(|_| Ok(()));

        S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, ENCODED_KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .expect("should succeed");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_utf8_body_writes_nothing(mut fixture: TestFixture) {
        fixture
            .blob_fetcher
            .expect_fetch()
            .once()
            .returning(|_, _| Ok(vec![0xff, 0xfe, 0xfd]));

        fixture.users_repository.expect_put_user().never();

        let error = S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, LambdaError::Unknown(_)));
        assert!(error.to_string().contains("not valid UTF-8"));
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_json_body_writes_nothing(mut fixture: TestFixture) {
        fixture
            .blob_fetcher
            .expect_fetch()
            .once()
            .returning(|_, _| Ok(b"this is not json".to_vec()));

        fixture.users_repository.expect_put_user().never();

        let error = S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, LambdaError::Unknown(_)));
        assert!(error.to_string().contains("JSON array"));
    }

    #[rstest]
    #[tokio::test]
    async fn non_array_json_body_writes_nothing(mut fixture: TestFixture) {
        fixture
            .blob_fetcher
            .expect_fetch()
            .once()
            .returning(|_, _| Ok(br#"{"username":"alice","role":"admin"}"#.to_vec()));

        fixture.users_repository.expect_put_user().never();

        let error = S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, LambdaError::Unknown(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_write_keeps_earlier_records_and_skips_later_ones(mut fixture: TestFixture) {
        let body = r#"[
            {"username":"alice","role":"admin"},
            {"username":"bob","role":"editor"},
            {"username":"carol","role":"viewer"}
        ]"#;
        fixture
            .blob_fetcher
            .expect_fetch()
            .once()
            .returning(move |_, _| Ok(body.as_bytes().to_vec()));

        let mut seq = Sequence::new();
        fixture
            .users_repository
            .expect_put_user()
            .with(eq(user("alice", "admin")))
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        fixture
            .users_repository
            .expect_put_user()
            .with(eq(user("bob", "editor")))
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Err(UsersRepositoryError::Unknown(anyhow!("throttled!"))));
        fixture
            .users_repository
            .expect_put_user()
            .with(eq(user("carol", "viewer")))
            .never();

        let error = S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, LambdaError::Unknown(_)));
        assert!(error.to_string().contains("throttled!"));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_object_writes_nothing(mut fixture: TestFixture) {
        fixture.blob_fetcher.expect_fetch().once().returning(|_, _| {
            Err(BlobFetcherError::ObjectNotFound(format!(
                "Object {KEY_FOR_MOCK_REQUESTS} not found in bucket {BUCKET_FOR_MOCK_REQUESTS}"
            )))
        });

        fixture.users_repository.expect_put_user().never();

        let error = S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, LambdaError::NotFound(_)));
        assert!(error.to_string().contains(BUCKET_FOR_MOCK_REQUESTS));
        assert!(error.to_string().contains(KEY_FOR_MOCK_REQUESTS));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_event_is_a_no_op(mut fixture: TestFixture) {
        fixture.blob_fetcher.expect_fetch().never();
        fixture.users_repository.expect_put_user().never();

        let event: S3Event = serde_json::from_value(json!({ "Records": [] })).unwrap();

        S3UserLoader::run(event, &persisted(fixture))
            .await
            .expect("should succeed");
    }

    #[rstest]
    #[tokio::test]
    async fn record_without_object_key_is_an_event_shape_error(mut fixture: TestFixture) {
        fixture.blob_fetcher.expect_fetch().never();
        fixture.users_repository.expect_put_user().never();

        let event: S3Event = serde_json::from_value(json!({
            "Records": [record_json(BUCKET_FOR_MOCK_REQUESTS, Value::Null)]
        }))
        .unwrap();

        let error = S3UserLoader::run(event, &persisted(fixture)).await.unwrap_err();

        assert!(matches!(error, LambdaError::Unknown(_)));
        assert!(error.to_string().contains("missing the object key"));
    }

    #[rstest]
    #[tokio::test]
    async fn record_missing_username_aborts_before_any_write(mut fixture: TestFixture) {
        let body = r#"[{"username":"alice","role":"admin"},{"role":"editor"}]"#;
        fixture
            .blob_fetcher
            .expect_fetch()
            .once()
            .returning(move |_, _| Ok(body.as_bytes().to_vec()));

        // The whole array is decoded before any write, so the malformed
        // second record means the first one is never attempted either.
        fixture.users_repository.expect_put_user().never();

        let error = S3UserLoader::run(
            s3_event(BUCKET_FOR_MOCK_REQUESTS, KEY_FOR_MOCK_REQUESTS),
            &persisted(fixture),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, LambdaError::Unknown(_)));
    }
}
