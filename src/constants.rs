pub mod team {

    /// Maximum simultaneous members per team. A team is full at `CAPACITY`.
    pub const CAPACITY: usize = 5;

    /// Maximum team name length, in characters.
    pub const MAX_NAME_LEN: usize = 62;
}

pub mod messages {

    pub const PER_PAGE: u64 = 30;

    pub const MAX_LEN: usize = 1000;
}

pub mod session {

    pub const USER_ID_KEY: &str = "user_id";
}
