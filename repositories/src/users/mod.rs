use async_trait::async_trait;
use model::user::User;

#[cfg(feature = "test_mocks")]
use mockall::mock;

pub mod users_repository_impl;

#[derive(Debug, thiserror::Error)]
pub enum UsersRepositoryError {
    #[error("{0:#}")]
    Unknown(anyhow::Error),
}

#[async_trait]
pub trait UsersRepository
where
    Self: Sync + Send,
{
    async fn put_user(&self, user: User) -> Result<(), UsersRepositoryError>;
}

#[cfg(feature = "test_mocks")]
mock! {
    pub UsersRepository {}
    #[async_trait]
    impl UsersRepository for UsersRepository {
        async fn put_user(&self, user: User) -> Result<(), UsersRepositoryError>;
    }
}
