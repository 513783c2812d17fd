use crate::feed::learner::LearnedPreferences;
use crate::feed::strategy::{
    fetch_ladder, EngagementPhase, PagePolicy, EXPLORATION_SWIPE_CEILING,
    PERSONALIZATION_ACCEPT_FLOOR, RANDOM_PAGE_SPAN,
};

fn profile() -> LearnedPreferences {
    LearnedPreferences {
        brands: vec!["Azimut".to_string()],
        boat_types: vec!["Motor Yacht".to_string()],
        average_price: 800_000.0,
        average_length: 16.0,
        average_year: 2022.0,
        ..LearnedPreferences::default()
    }
}

#[test]
fn phase_follows_swipe_volume_and_accept_density() {
    assert_eq!(
        EngagementPhase::resolve(0, 0, false),
        EngagementPhase::Exploration
    );
    // Volume alone keeps new members exploring, profile or not.
    assert_eq!(
        EngagementPhase::resolve(EXPLORATION_SWIPE_CEILING - 1, 20, true),
        EngagementPhase::Exploration
    );
    assert_eq!(
        EngagementPhase::resolve(EXPLORATION_SWIPE_CEILING, 2, false),
        EngagementPhase::Baseline
    );
    // Accepts without a usable profile stay baseline.
    assert_eq!(
        EngagementPhase::resolve(40, PERSONALIZATION_ACCEPT_FLOOR, false),
        EngagementPhase::Baseline
    );
    assert_eq!(
        EngagementPhase::resolve(40, PERSONALIZATION_ACCEPT_FLOOR, true),
        EngagementPhase::Personalized
    );
}

#[test]
fn phase_dials_scale_from_churn_to_precision() {
    assert!((EngagementPhase::Exploration.jitter_factor() - 1.5).abs() < 1e-9);
    assert!((EngagementPhase::Baseline.jitter_factor() - 0.8).abs() < 1e-9);
    assert!((EngagementPhase::Personalized.jitter_factor() - 0.2).abs() < 1e-9);

    assert!((EngagementPhase::Exploration.admission_threshold() - 5.0).abs() < 1e-9);
    assert!((EngagementPhase::Baseline.admission_threshold() - 20.0).abs() < 1e-9);
    assert!((EngagementPhase::Personalized.admission_threshold() - 20.0).abs() < 1e-9);

    assert_eq!(EngagementPhase::Exploration.page_cut(), 12);
    assert_eq!(EngagementPhase::Baseline.page_cut(), 20);
    assert_eq!(EngagementPhase::Personalized.page_cut(), 20);
}

#[test]
fn exploration_ladder_starts_small_then_relaxes_then_opens() {
    let ladder = fetch_ladder(EngagementPhase::Exploration, None);
    assert_eq!(ladder.len(), 3);

    assert_eq!(ladder[0].label, "exploration");
    assert_eq!(ladder[0].filters.get("lengthTo"), Some("15"));
    assert_eq!(ladder[0].page, PagePolicy::Requested);

    assert_eq!(ladder[1].label, "relaxed");
    assert_eq!(ladder[1].filters.get("priceFrom"), Some("100000"));
    assert_eq!(ladder[1].filters.len(), 1);

    assert_eq!(ladder[2].label, "open");
    assert!(ladder[2].filters.is_empty());
    assert_eq!(ladder[2].page, PagePolicy::RandomWithin(RANDOM_PAGE_SPAN));
}

#[test]
fn baseline_ladder_is_one_open_query() {
    let ladder = fetch_ladder(EngagementPhase::Baseline, None);
    assert_eq!(ladder.len(), 1);
    assert_eq!(ladder[0].label, "baseline");
    assert!(ladder[0].filters.is_empty());
    assert_eq!(ladder[0].page, PagePolicy::Requested);
}

#[test]
fn personalized_filters_band_around_the_profile() {
    let ladder = fetch_ladder(EngagementPhase::Personalized, Some(&profile()));
    assert_eq!(ladder.len(), 3);

    let filters = &ladder[0].filters;
    assert_eq!(ladder[0].label, "personalized");
    assert_eq!(filters.get("priceFrom"), Some("320000"));
    assert_eq!(filters.get("priceTo"), Some("1280000"));
    assert_eq!(filters.get("lengthFrom"), Some("9.6"));
    assert_eq!(filters.get("lengthTo"), Some("22.4"));
    assert_eq!(filters.get("yearFrom"), Some("2002"));
    assert_eq!(filters.get("boatType"), Some("Motor Yacht"));
    assert_eq!(filters.len(), 6);

    // Fallback rungs stay in place behind the targeted query.
    assert_eq!(ladder[1].label, "relaxed");
    assert_eq!(ladder[2].label, "open");
}

#[test]
fn classic_tastes_skip_the_year_floor() {
    let mut vintage_profile = profile();
    vintage_profile.average_year = 1975.0;

    let ladder = fetch_ladder(EngagementPhase::Personalized, Some(&vintage_profile));
    assert_eq!(ladder[0].filters.get("yearFrom"), None);
    assert_eq!(ladder[0].filters.get("priceFrom"), Some("320000"));
}

#[test]
fn sparse_profiles_leave_filters_unset() {
    let empty_profile = LearnedPreferences::default();

    let ladder = fetch_ladder(EngagementPhase::Personalized, Some(&empty_profile));
    assert!(ladder[0].filters.is_empty());
}
