/// `ActiveModelBehavior` that stamps `created_at` on insert and
/// `updated_at` on every save
macro_rules! timestamped_behavior {
    () => {
        #[async_trait::async_trait]
        impl sea_orm::ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, sea_orm::DbErr>
            where
                C: sea_orm::ConnectionTrait,
            {
                let now = chrono::Utc::now();

                if insert {
                    if self.created_at.is_not_set() {
                        self.created_at = sea_orm::ActiveValue::Set(now);
                    }
                    if self.updated_at.is_not_set() {
                        self.updated_at = sea_orm::ActiveValue::Set(now);
                    }
                } else {
                    self.updated_at = sea_orm::ActiveValue::Set(now);
                }

                Ok(self)
            }
        }
    };
}

pub(crate) use timestamped_behavior;
