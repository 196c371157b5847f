use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Time};
use uuid::Uuid;

/// Durable player record: identity plus monotonically merged progress aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Display name chosen at registration (or generated for guests).
    pub username: String,
    /// Optional login email; unique when present.
    pub email: Option<String>,
    /// Bcrypt hash of the password; absent for guest accounts.
    pub password_hash: Option<String>,
    /// Optional avatar URL.
    pub avatar: Option<String>,
    /// Best score ever synced; never decreases.
    pub total_score: i64,
    /// Longest run distance ever synced; never decreases.
    pub best_distance: f64,
    /// Lifetime coin balance, incremented on every sync.
    pub total_coins: i64,
    /// Highest level reached; never decreases.
    pub level: i32,
    /// Experience points; last-write-wins on sync.
    pub experience: i64,
    /// Unlocked achievement identifiers.
    pub achievements: Vec<String>,
    /// Owned skin identifiers.
    pub skins: Vec<String>,
    /// Currently equipped skin.
    pub current_skin: String,
    /// True for anonymous guest accounts.
    pub is_guest: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Last successful credential login.
    pub last_login: Option<OffsetDateTime>,
    /// Last successful progress sync.
    pub last_sync_at: Option<OffsetDateTime>,
}

/// Fields required to create a new player row.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_guest: bool,
    /// Skin granted to every new account.
    pub starting_skin: String,
    pub now: OffsetDateTime,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub current_skin: Option<String>,
}

impl ProfileChanges {
    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
            && self.current_skin.is_none()
    }
}

/// Progress reported by the client at the end of a run, applied atomically.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Run score; merged into `total_score` via max.
    pub score: i64,
    /// Run distance; merged into `best_distance` via max.
    pub distance: f64,
    /// Coins to add to `total_coins`. Not idempotent on retry.
    pub coins: i64,
    /// Level reached; merged via max.
    pub level: i32,
    /// Replaces the stored experience value.
    pub experience: i64,
    /// When present, replaces the achievement set wholesale.
    pub achievements: Option<Vec<String>>,
    /// When present, one immutable session row is recorded alongside.
    pub session: Option<NewGameSession>,
    pub now: OffsetDateTime,
}

/// Session payload accompanying a sync request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGameSession {
    pub duration_seconds: i64,
    pub obstacles_avoided: i32,
    pub obstacles_hit: i32,
    /// Coins reported by the session itself. The aggregate credit uses the
    /// top-level `coins` field instead; the two are not reconciled.
    pub coins_collected: i64,
    pub power_ups_used: i32,
    pub level_reached: i32,
}

/// Immutable record of one completed run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSessionEntity {
    pub id: Uuid,
    pub player_id: Uuid,
    pub score: i64,
    pub distance: f64,
    pub duration_seconds: i64,
    pub obstacles_avoided: i32,
    pub obstacles_hit: i32,
    pub coins_collected: i64,
    pub power_ups_used: i32,
    pub level_reached: i32,
    pub created_at: OffsetDateTime,
}

/// A scored submission bound to a time partition. Rank is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntryEntity {
    pub id: Uuid,
    /// Absent for anonymous submissions.
    pub player_id: Option<Uuid>,
    pub score: i64,
    pub distance: f64,
    pub level: i32,
    pub time_range: TimeWindow,
    pub created_at: OffsetDateTime,
}

/// Fields required to submit a new leaderboard entry.
#[derive(Debug, Clone)]
pub struct NewLeaderboardEntry {
    pub player_id: Option<Uuid>,
    pub score: i64,
    pub distance: f64,
    pub level: i32,
    pub window: TimeWindow,
    pub now: OffsetDateTime,
}

/// Outcome of a submission: the stored entry id and a best-effort snapshot rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedEntry {
    pub id: Uuid,
    /// 1 + count of strictly greater scores in the same partition/window at
    /// submission time. Concurrent submissions can change it immediately.
    pub rank: i64,
}

/// A leaderboard entry annotated with its computed rank and player info.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntryEntity {
    pub id: Uuid,
    /// 1-based rank from the strictly-greater count rule; ties share rank.
    pub rank: i64,
    pub score: i64,
    pub distance: f64,
    pub level: i32,
    /// Display name of the submitting player, if known.
    pub username: Option<String>,
    pub avatar: Option<String>,
    /// The submitting player's current level, if known.
    pub player_level: Option<i32>,
    pub created_at: OffsetDateTime,
}

/// Parameters for a paginated leaderboard listing.
#[derive(Debug, Clone, Copy)]
pub struct LeaderboardQuery {
    pub window: TimeWindow,
    pub sort: SortField,
    pub limit: i64,
    pub offset: i64,
    pub now: OffsetDateTime,
}

/// One page of ranked entries plus the total row count for pagination.
#[derive(Debug, Clone)]
pub struct LeaderboardPage {
    pub entries: Vec<RankedEntryEntity>,
    pub total: i64,
}

/// Aggregate statistics over a windowed leaderboard partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowStatsEntity {
    pub total_entries: i64,
    pub unique_players: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub average_distance: f64,
    pub highest_distance: f64,
    pub average_level: f64,
    pub highest_level: i32,
}

/// One row of the top-players board: the player joined with their best
/// windowed entry. Players without an entry show zeroed bests.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPlayerEntity {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub level: i32,
    pub total_coins: i64,
    pub best_score: i64,
    pub best_distance: f64,
    pub best_level: i32,
    /// Positional rank under the requested criteria; ties are not shared.
    pub rank: i64,
}

/// Aggregates over one player's sessions inside a time window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStatsEntity {
    pub games_played: i64,
    pub average_score: f64,
    pub best_score: i64,
    pub average_distance: f64,
    pub best_distance: f64,
    pub average_duration: f64,
}

/// Aggregate statistics for one player, derived from their session history.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatsEntity {
    pub total_score: i64,
    pub best_distance: f64,
    pub total_coins: i64,
    pub level: i32,
    pub experience: i64,
    pub achievements: Vec<String>,
    pub games_played: i64,
    pub average_score: f64,
}

/// A recorded in-game or real-money purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseEntity {
    pub id: Uuid,
    pub player_id: Uuid,
    pub item_id: String,
    pub item_type: String,
    pub price: f64,
    pub currency: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Fields required to record a purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub player_id: Uuid,
    pub item_id: String,
    pub item_type: String,
    pub price: f64,
    pub currency: String,
    pub transaction_id: Option<String>,
    /// When true the purchase also credits `total_coins` by `price`, in the
    /// same transaction as the purchase row.
    pub credits_coins: bool,
    pub now: OffsetDateTime,
}

/// Time partition over leaderboard entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// No time filter.
    #[default]
    All,
    /// Entries created at or after the start of the current UTC calendar day.
    Daily,
    /// Entries created within the last 7x24h.
    Weekly,
    /// Entries created within the last 30x24h.
    Monthly,
}

impl TimeWindow {
    /// Lower creation-time bound for this window, as a pure function of `now`.
    /// `None` means the partition is unfiltered.
    pub fn cutoff(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            TimeWindow::All => None,
            TimeWindow::Daily => Some(now.replace_time(Time::MIDNIGHT)),
            TimeWindow::Weekly => Some(now - Duration::days(7)),
            TimeWindow::Monthly => Some(now - Duration::days(30)),
        }
    }

    /// Partition tag stored with each entry.
    pub fn tag(self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::Daily => "daily",
            TimeWindow::Weekly => "weekly",
            TimeWindow::Monthly => "monthly",
        }
    }

    /// Parse a stored partition tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "all" => Some(TimeWindow::All),
            "daily" => Some(TimeWindow::Daily),
            "weekly" => Some(TimeWindow::Weekly),
            "monthly" => Some(TimeWindow::Monthly),
            _ => None,
        }
    }
}

/// Field a leaderboard listing is ordered and ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Score,
    Distance,
    Level,
}

impl SortField {
    /// Column name backing this sort field. Values come from this fixed set
    /// only; they are never taken from request strings.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Score => "score",
            SortField::Distance => "distance",
            SortField::Level => "level",
        }
    }

    /// Sort key of an entry under this field, as an order-preserving value.
    pub fn key(self, score: i64, distance: f64, level: i32) -> f64 {
        match self {
            SortField::Score => score as f64,
            SortField::Distance => distance,
            SortField::Level => f64::from(level),
        }
    }
}

/// Criteria the top-players board is ordered by. Unlike [`SortField`] it can
/// also rank by the players' coin balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TopCriteria {
    #[default]
    Score,
    Distance,
    Level,
    Coins,
}

impl TopCriteria {
    /// Ordering key for a joined player row, as an order-preserving value.
    pub fn key(self, player: &TopPlayerEntity) -> f64 {
        match self {
            TopCriteria::Score => player.best_score as f64,
            TopCriteria::Distance => player.best_distance,
            TopCriteria::Level => f64::from(player.best_level),
            TopCriteria::Coins => player.total_coins as f64,
        }
    }

    /// SQL ordering expression. Values come from this fixed set only; they
    /// are never taken from request strings.
    pub fn order_expr(self) -> &'static str {
        match self {
            TopCriteria::Score => "COALESCE(MAX(l.score), 0)",
            TopCriteria::Distance => "COALESCE(MAX(l.distance), 0)",
            TopCriteria::Level => "COALESCE(MAX(l.level), 0)",
            TopCriteria::Coins => "p.total_coins",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn all_window_is_unfiltered() {
        assert_eq!(TimeWindow::All.cutoff(OffsetDateTime::now_utc()), None);
    }

    #[test]
    fn daily_window_starts_at_utc_midnight() {
        let now = datetime!(2024-03-15 17:42:10 UTC);
        assert_eq!(
            TimeWindow::Daily.cutoff(now),
            Some(datetime!(2024-03-15 00:00:00 UTC))
        );
    }

    #[test]
    fn weekly_and_monthly_windows_are_rolling() {
        let now = datetime!(2024-03-15 12:00:00 UTC);
        assert_eq!(
            TimeWindow::Weekly.cutoff(now),
            Some(datetime!(2024-03-08 12:00:00 UTC))
        );
        assert_eq!(
            TimeWindow::Monthly.cutoff(now),
            Some(datetime!(2024-02-14 12:00:00 UTC))
        );
    }

    #[test]
    fn tags_round_trip() {
        for window in [
            TimeWindow::All,
            TimeWindow::Daily,
            TimeWindow::Weekly,
            TimeWindow::Monthly,
        ] {
            assert_eq!(TimeWindow::from_tag(window.tag()), Some(window));
        }
        assert_eq!(TimeWindow::from_tag("hourly"), None);
    }
}
