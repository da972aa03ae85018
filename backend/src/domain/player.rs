/// Discord user id. Zero means "unspecified/new" per spec.md §3.
pub type PlayerId = i64;

/// A registered player. Primary key and equality are both `discord_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Player {
    pub discord_id: PlayerId,
    pub name: String,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.discord_id == other.discord_id
    }
}
impl Eq for Player {}

impl std::hash::Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.discord_id.hash(state);
    }
}

impl Player {
    pub fn is_valid(&self) -> bool {
        self.discord_id != 0
    }
}
