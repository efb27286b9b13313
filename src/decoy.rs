// src/decoy.rs
// Decoy trap pages for classified bots. A rejected automated client sees one
// of these instead of an honest block page, so detection is indistinguishable
// from a site that simply is not finished.

use rand::seq::SliceRandom;
use rand::Rng;

/// Collaborator contract: the host replaces the visible document with a
/// decoy and records the visit however it likes.
pub trait DeceptionPresenter {
    fn show(&self, reason: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoyVariant {
    UnderConstruction,
    Maintenance,
    ComingSoon,
}

const ALL_VARIANTS: [DecoyVariant; 3] = [
    DecoyVariant::UnderConstruction,
    DecoyVariant::Maintenance,
    DecoyVariant::ComingSoon,
];

/// Picks a decoy variant at random so repeat visits don't see a static wall.
pub fn choose_variant(rng: &mut impl Rng) -> DecoyVariant {
    *ALL_VARIANTS
        .choose(rng)
        .unwrap_or(&DecoyVariant::UnderConstruction)
}

pub fn random_variant() -> DecoyVariant {
    choose_variant(&mut rand::thread_rng())
}

pub fn render_decoy_page(variant: DecoyVariant) -> String {
    match variant {
        DecoyVariant::UnderConstruction => DECOY_CONSTRUCTION_HTML.to_string(),
        DecoyVariant::Maintenance => DECOY_MAINTENANCE_HTML.to_string(),
        DecoyVariant::ComingSoon => DECOY_COMING_SOON_HTML.to_string(),
    }
}

const DECOY_CONSTRUCTION_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Under Construction</title>
  <style>
    body { font-family: sans-serif; background: #f4f4f4; margin: 0; }
    .wrap { max-width: 520px; margin: 12vh auto; background: #fff; padding: 2.5em; border-radius: 8px; box-shadow: 0 2px 8px #ccc; text-align: center; }
    h1 { color: #444; }
    .bar { height: 10px; background: #e8e8e8; border-radius: 5px; overflow: hidden; margin: 2em 0 1em; }
    .bar span { display: block; height: 100%; width: 62%; background: #f0ad4e; }
  </style>
</head>
<body>
  <div class="wrap">
    <h1>&#128679; Under Construction</h1>
    <p>We're building something great here. Check back soon!</p>
    <div class="bar"><span></span></div>
    <p><small>Estimated completion: 62%</small></p>
  </div>
</body>
</html>
"#;

const DECOY_MAINTENANCE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Scheduled Maintenance</title>
  <style>
    body { font-family: sans-serif; background: #f4f4f4; margin: 0; }
    .wrap { max-width: 520px; margin: 12vh auto; background: #fff; padding: 2.5em; border-radius: 8px; box-shadow: 0 2px 8px #ccc; text-align: center; }
    h1 { color: #444; }
  </style>
</head>
<body>
  <div class="wrap">
    <h1>&#128295; Scheduled Maintenance</h1>
    <p>We're performing scheduled maintenance and will be back shortly.</p>
    <p>Thank you for your patience.</p>
  </div>
</body>
</html>
"#;

const DECOY_COMING_SOON_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Coming Soon</title>
  <style>
    body { font-family: sans-serif; background: #20232a; color: #eee; margin: 0; }
    .wrap { max-width: 520px; margin: 16vh auto; padding: 2.5em; text-align: center; }
    h1 { letter-spacing: 2px; }
  </style>
</head>
<body>
  <div class="wrap">
    <h1>Coming Soon</h1>
    <p>Something new is on its way. Stay tuned.</p>
  </div>
</body>
</html>
"#;
