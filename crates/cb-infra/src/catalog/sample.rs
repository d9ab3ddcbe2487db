use cb_core::ClipperSummary;

/// Fixed list rendered when a source cannot be fetched, so a listing is never
/// empty or broken. Order and content are stable across calls.
pub fn sample_clippers() -> Vec<ClipperSummary> {
    vec![
        ClipperSummary::new("sample-1", "Alex Rivera")
            .with_avatar("https://placehold.co/96x96?text=AR")
            .with_counts(128_000, 4_200_000)
            .with_note("Gaming highlights, fast turnaround"),
        ClipperSummary::new("sample-2", "Priya Nair")
            .with_avatar("https://placehold.co/96x96?text=PN")
            .with_counts(86_500, 2_950_000)
            .with_note("Podcast shorts with captions"),
        ClipperSummary::new("sample-3", "Marco Bellini")
            .with_avatar("https://placehold.co/96x96?text=MB")
            .with_counts(41_200, 1_100_000),
        ClipperSummary::new("sample-4", "Jun Park")
            .with_avatar("https://placehold.co/96x96?text=JP")
            .with_counts(12_800, 390_000)
            .with_note("Vlog edits and travel reels"),
    ]
}
