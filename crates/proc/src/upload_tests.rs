use super::*;

#[test]
fn upload_timeout_matches_the_documented_3600s_budget() {
    assert_eq!(UPLOAD_TIMEOUT, Duration::from_secs(3_600));
}
