//! REST surface consumed by the floor view
//!
//! The trait exists so the editor and the sync service can run against an
//! in-memory implementation in tests; production code uses [`HttpApi`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{ClientResult, HttpClient};
use shared::{ReservationHint, SavePositionsRequest, Table, TableCreate, TableUpdate};

/// Server operations the floor view depends on
#[async_trait]
pub trait FloorApi: Send + Sync + std::fmt::Debug {
    /// `GET /mesas?activa=true` - active tables only
    async fn list_tables(&self, cancel: &CancellationToken) -> ClientResult<Vec<Table>>;

    /// `GET /reservas/proximas` - reservations within the upcoming window
    async fn upcoming_reservations(
        &self,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<ReservationHint>>;

    /// `PATCH /mesas/posiciones` - persist every placement in one batch
    async fn save_positions(
        &self,
        batch: &SavePositionsRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<()>;

    /// `POST /mesas`
    async fn create_table(
        &self,
        payload: &TableCreate,
        cancel: &CancellationToken,
    ) -> ClientResult<Table>;

    /// `PUT /mesas/:id`
    async fn update_table(
        &self,
        id: i64,
        payload: &TableUpdate,
        cancel: &CancellationToken,
    ) -> ClientResult<Table>;

    /// `DELETE /mesas/:id`
    async fn delete_table(&self, id: i64, cancel: &CancellationToken) -> ClientResult<()>;
}

/// [`FloorApi`] over the real HTTP boundary
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: HttpClient,
}

impl HttpApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl FloorApi for HttpApi {
    async fn list_tables(&self, cancel: &CancellationToken) -> ClientResult<Vec<Table>> {
        self.http.get("mesas?activa=true", cancel).await
    }

    async fn upcoming_reservations(
        &self,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<ReservationHint>> {
        self.http.get("reservas/proximas", cancel).await
    }

    async fn save_positions(
        &self,
        batch: &SavePositionsRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        self.http.patch("mesas/posiciones", batch, cancel).await
    }

    async fn create_table(
        &self,
        payload: &TableCreate,
        cancel: &CancellationToken,
    ) -> ClientResult<Table> {
        self.http.post("mesas", payload, cancel).await
    }

    async fn update_table(
        &self,
        id: i64,
        payload: &TableUpdate,
        cancel: &CancellationToken,
    ) -> ClientResult<Table> {
        self.http.put(&format!("mesas/{id}"), payload, cancel).await
    }

    async fn delete_table(&self, id: i64, cancel: &CancellationToken) -> ClientResult<()> {
        self.http.delete(&format!("mesas/{id}"), cancel).await
    }
}
