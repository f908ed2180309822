use async_trait::async_trait;
use clinicbook_core::errors::ScheduleResult;
use clinicbook_core::models::appointment::Appointment;
use clinicbook_core::store::{AppointmentStore, BookingScope, DayWindow};
use mockall::mock;

mock! {
    pub AppointmentStore {}

    #[async_trait]
    impl AppointmentStore for AppointmentStore {
        async fn active_appointments(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Vec<Appointment>>;
        async fn begin_booking(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Box<dyn BookingScope>>;
        async fn ping(&self) -> ScheduleResult<()>;
    }
}
