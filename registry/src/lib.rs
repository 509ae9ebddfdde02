use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::notifier::BroadcastNotifier;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::reservation::ReservationRepositoryImpl;
use adapter::repository::room::RoomRepositoryImpl;
use adapter::repository::user::UserRepositoryImpl;
use kernel::notifier::ReservationNotifier;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::room::RoomRepository;
use kernel::repository::user::UserRepository;
use kernel::service::reservation::ReservationService;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    room_repository: Arc<dyn RoomRepository>,
    reservation_service: Arc<ReservationService>,
    notifier: Arc<BroadcastNotifier>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let room_repository = Arc::new(RoomRepositoryImpl::new(pool.clone()));
        let user_repository: Arc<dyn UserRepository> =
            Arc::new(UserRepositoryImpl::new(pool.clone()));
        let notifier = Arc::new(BroadcastNotifier::new(16));
        let reservation_service = Arc::new(ReservationService::new(
            Arc::new(ReservationRepositoryImpl::new(pool.clone())),
            user_repository,
            notifier.clone() as Arc<dyn ReservationNotifier>,
        ));
        Self {
            health_check_repository,
            room_repository,
            reservation_service,
            notifier,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn room_repository(&self) -> Arc<dyn RoomRepository> {
        self.room_repository.clone()
    }

    pub fn reservation_service(&self) -> Arc<ReservationService> {
        self.reservation_service.clone()
    }

    /// 予約成立イベントの購読口（WebSocket ハンドラなどが使う）
    pub fn notifier(&self) -> Arc<BroadcastNotifier> {
        self.notifier.clone()
    }
}
