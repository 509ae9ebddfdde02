use crate::database::{model::reservation::ReservationListingRow, ConnectionPool};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use derive_new::new;
use kernel::model::id::{ReservationId, RoomId, UserId};
use kernel::model::reservation::{
    event::CreateReservation, Reservation, ReservationListing, ReservationStatus,
};
use kernel::repository::reservation::ReservationRepository;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルを SERIALIZABLE に設定する。
        // これにより、同じ部屋・同じ時間帯への同時リクエストが
        // 両方とも空きチェックを通過して二重予約になる競合を防ぐ
        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定の部屋 ID をもつ部屋が存在するか
        // - 存在した場合、その時間帯に重なる未キャンセル予約が無いか
        //
        // 上記の両方が Yes だった場合、このブロック以降の処理に進む
        {
            //
            // ① 部屋の存在確認
            //
            let room_row = sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT room_id
                FROM rooms
                WHERE room_id = $1
                "#,
            )
            .bind(event.room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if room_row.is_none() {
                return Err(AppError::EntityNotFound(format!(
                    "room ({}) not found",
                    event.room_id
                )));
            }

            //
            // ② 希望時間帯が既存の未キャンセル予約と重なっていないか確認
            //    重複条件（半開区間）：
            //        existing.start < new.end AND existing.end > new.start
            //
            let overlap = sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT reservation_id
                FROM reservations
                WHERE room_id = $1
                  AND status <> 'CANCELLED'
                  AND start_time < $3
                  AND end_time > $2
                LIMIT 1
                "#,
            )
            .bind(event.room_id)
            .bind(event.start_time)
            .bind(event.end_time)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if overlap.is_some() {
                return Err(AppError::RoomUnavailable(format!(
                    "room ({}) is already reserved in the requested window",
                    event.room_id
                )));
            }
        }

        // 予約本体を登録する
        let reservation_id = ReservationId::new();
        let created_at = Local::now();
        let res = sqlx::query(
            r#"
            INSERT INTO reservations
            (reservation_id, user_id, room_id, start_time, end_time, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reservation_id)
        .bind(event.reserved_by)
        .bind(event.room_id)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(ReservationStatus::Pending)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been created".into(),
            ));
        }

        // メンバー行を同一トランザクションでまとめて登録する
        let names: Vec<String> = event.members.iter().map(|m| m.member_name.clone()).collect();
        let emails: Vec<String> = event
            .members
            .iter()
            .map(|m| m.member_email.clone())
            .collect();
        let res = sqlx::query(
            r#"
            INSERT INTO reservation_members (reservation_id, member_name, member_email)
            SELECT $1, name, email
            FROM UNNEST($2::text[], $3::text[]) AS t(name, email)
            "#,
        )
        .bind(reservation_id)
        .bind(&names)
        .bind(&emails)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < event.members.len() as u64 {
            return Err(AppError::NoRowsAffectedError(
                "Not all reservation member records have been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        let CreateReservation {
            reserved_by,
            room_id,
            start_time,
            end_time,
            members,
        } = event;
        Ok(Reservation {
            reservation_id,
            reserved_by,
            room_id,
            start_time,
            end_time,
            status: ReservationStatus::Pending,
            created_at,
            members,
        })
    }

    async fn is_available(
        &self,
        room_id: RoomId,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> AppResult<bool> {
        // キャンセル済みの予約は重なり判定から除外する
        let overlap = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT reservation_id
            FROM reservations
            WHERE room_id = $1
              AND status <> 'CANCELLED'
              AND start_time < $3
              AND end_time > $2
            LIMIT 1
            "#,
        )
        .bind(room_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(overlap.is_none())
    }

    // 予約行は削除せず CANCELLED に更新するだけ（監査用に残す）
    async fn cancel(&self, reservation_id: ReservationId) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'CANCELLED'
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "reservation ({reservation_id}) not found"
            )));
        }

        Ok(())
    }

    // 期限切れの PENDING を 1 文の UPDATE で確定させる。
    // 行ごとのループにしないことで、同時実行されても互いに冪等になる
    async fn confirm_expired(&self, now: DateTime<Local>) -> AppResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'CONFIRMED'
            WHERE status = 'PENDING'
              AND end_time <= $1
            "#,
        )
        .bind(now)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected())
    }

    // 所有している予約と、メンバーとして載っている予約の両方を返す
    async fn find_for_user(
        &self,
        user_id: UserId,
        email: &str,
    ) -> AppResult<Vec<ReservationListing>> {
        sqlx::query_as::<_, ReservationListingRow>(
            r#"
            SELECT
                r.reservation_id,
                r.user_id,
                r.room_id,
                rm.room_name,
                rm.location,
                r.start_time,
                r.end_time,
                r.status,
                (
                    SELECT COUNT(*)
                    FROM reservation_members m
                    WHERE m.reservation_id = r.reservation_id
                ) AS member_count
            FROM reservations AS r
            INNER JOIN rooms AS rm ON r.room_id = rm.room_id
            WHERE r.status <> 'CANCELLED'
              AND (
                r.user_id = $1
                OR EXISTS (
                    SELECT 1
                    FROM reservation_members m
                    WHERE m.reservation_id = r.reservation_id
                      AND m.member_email = $2
                )
              )
            ORDER BY r.start_time ASC
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(ReservationListing::from).collect())
        .map_err(AppError::SpecificOperationError)
    }
}

impl ReservationRepositoryImpl {
    // create メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}
