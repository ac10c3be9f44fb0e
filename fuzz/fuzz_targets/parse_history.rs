#![no_main]

use libfuzzer_sys::fuzz_target;
use listenstat::{PlayHistory, TopArtistsOptions};
use time::macros::date;

fuzz_target!(|data: &[u8]| {
    let Ok(history) = PlayHistory::from_json_slice(data) else {
        return;
    };

    let total = history.total_time();
    assert_eq!(
        total.ms,
        history
            .iter()
            .fold(0_u64, |sum, event| sum.saturating_add(event.ms_played))
    );

    let options = TopArtistsOptions {
        exclude_skipped: data.len() % 2 == 0,
        ..TopArtistsOptions::default()
    };
    let top = history.top_artists(&options, 5);
    assert!(top.len() <= 5);
    assert!(top.windows(2).all(|pair| pair[0].plays >= pair[1].plays));

    assert_eq!(history.most_played_song().is_ok(), !history.is_empty());
    assert_eq!(history.most_played_album().is_ok(), !history.is_empty());

    if let Ok(filtered) = history.filter_by_date_range(date!(2020 - 01 - 01), date!(2030 - 12 - 31)) {
        assert!(filtered.len() <= history.len());
    }
});
