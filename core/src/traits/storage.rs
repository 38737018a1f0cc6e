use async_trait::async_trait;

/// Durable key/value blob storage. Values are opaque strings; the store
/// decides what goes inside them.
#[async_trait]
pub trait Storage: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Returns `true` when something was removed.
    async fn remove(&self, key: &str) -> anyhow::Result<bool>;

    async fn health_check(&self) -> bool;
}
