/// Compute effective limit with precedence: global flag -> configured default.
#[must_use]
pub fn effective_limit(global: Option<u32>, default_limit: u32) -> u32 {
    global.unwrap_or(default_limit)
}
