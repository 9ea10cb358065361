// Placeholder company data used when LinkedIn blocks a scrape

use rand::Rng;
use std::collections::HashSet;

use crate::models::{ScrapedComment, ScrapedPage, ScrapedPost, ScrapedUser};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
const HOUR_MILLIS: i64 = 60 * 60 * 1000;

pub const MOCK_POST_COUNT: usize = 15;
pub const MOCK_COMMENTS_PER_POST: usize = 3;
pub const MOCK_EMPLOYEE_COUNT: usize = 12;
pub const MOCK_FOLLOWER_COUNT: usize = 8;

const BRAND_NAMES: &[(&str, &str)] = &[
    ("deepsolv", "DeepSolv"),
    ("google", "Google"),
    ("microsoft", "Microsoft"),
    ("amazon", "Amazon"),
    ("apple", "Apple"),
    ("meta", "Meta"),
    ("netflix", "Netflix"),
];

const INDUSTRIES: &[&str] = &[
    "Technology",
    "Software Development",
    "IT Services",
    "Consulting",
    "E-commerce",
];

const POST_TEMPLATES: &[&str] = &[
    "Excited to announce our latest product launch! 🚀",
    "We're hiring! Join our amazing team.",
    "Thank you to our incredible customers for the support.",
    "Check out our latest blog post on industry trends.",
    "Celebrating another successful quarter! 📈",
    "Our team participated in the tech conference today.",
    "New partnership announcement coming soon!",
    "Looking back at our journey this year.",
    "Tips for success in the tech industry.",
    "Meet our employee of the month! 🌟",
    "Proud to share our latest achievements.",
    "Innovation drives everything we do.",
    "Customer success story: How we helped transform businesses.",
    "Behind the scenes at our office.",
    "Welcoming new team members to the family!",
];

const HASHTAGS: &[&str] = &["tech", "innovation", "growth", "team", "success"];
const MEDIA_TYPES: &[&str] = &["image", "text", "video"];

const COMMENTER_NAMES: &[&str] = &[
    "John Smith",
    "Sarah Johnson",
    "Mike Williams",
    "Emily Davis",
    "Chris Brown",
    "Jessica Taylor",
    "David Wilson",
    "Amanda Martinez",
    "Ryan Anderson",
    "Lisa Thomas",
];

const COMMENT_TEXTS: &[&str] = &[
    "Great post! Very insightful.",
    "Congratulations on the achievement!",
    "Looking forward to more updates.",
    "This is exactly what we needed.",
    "Impressive work by the team!",
    "Thanks for sharing this information.",
    "Really inspiring content!",
    "Keep up the great work!",
    "This resonates with our experience.",
    "Would love to learn more about this.",
];

const FIRST_NAMES: &[&str] = &[
    "James", "Maria", "Robert", "Linda", "David", "Elizabeth", "William", "Jennifer", "Michael",
    "Patricia", "Richard", "Susan", "Joseph", "Margaret", "Thomas",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Thomas", "Jackson", "White", "Harris", "Martin", "Garcia", "Lee", "Robinson",
    "Clark", "Lewis", "Walker", "Hall", "Young", "King",
];

const JOB_TITLES: &[&str] = &[
    "Software Engineer",
    "Senior Developer",
    "Product Manager",
    "Data Scientist",
    "UX Designer",
    "Marketing Manager",
    "Sales Lead",
    "HR Manager",
    "DevOps Engineer",
    "QA Engineer",
    "Tech Lead",
    "Engineering Manager",
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Chicago, IL",
    "Denver, CO",
    "Los Angeles, CA",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

/// Known slugs get their brand spelling, everything else is title-cased.
pub fn display_name(page_id: &str) -> String {
    let lower = page_id.to_lowercase();
    BRAND_NAMES
        .iter()
        .find(|(slug, _)| *slug == lower)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| title_case(page_id))
}

fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Company profile only; relations are generated separately.
pub fn mock_page<R: Rng + ?Sized>(rng: &mut R, page_id: &str) -> ScrapedPage {
    let name = display_name(page_id);
    let initial: String = page_id
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();

    ScrapedPage {
        page_id: page_id.to_string(),
        linkedin_id: Some(format!("li_{}_{}", page_id, rng.random_range(1000..=9999))),
        url: Some(format!("https://www.linkedin.com/company/{}", page_id)),
        profile_picture: Some(format!(
            "https://placehold.co/200x200/3b82f6/white?text={}",
            initial
        )),
        description: Some(format!(
            "{} is a leading company focused on innovation and growth. \
             We specialize in delivering exceptional solutions to our clients worldwide.",
            name
        )),
        website: Some(format!("https://www.{}.com", page_id.to_lowercase())),
        industry: Some(pick(rng, INDUSTRIES).to_string()),
        follower_count: rng.random_range(5_000..=100_000),
        employee_count: rng.random_range(50..=5_000),
        specialities: Some("Technology,Innovation,Software Development,Consulting".to_string()),
        headquarters: Some("San Francisco, California".to_string()),
        founded_year: Some(rng.random_range(2000..=2020)),
        company_type: Some("Privately Held".to_string()),
        name: Some(name),
        ..Default::default()
    }
}

/// Posts are spaced two days apart, newest first.
pub fn mock_posts<R: Rng + ?Sized>(rng: &mut R, now: i64) -> Vec<ScrapedPost> {
    (0..MOCK_POST_COUNT)
        .map(|i| ScrapedPost {
            linkedin_post_id: Some(format!("mock_post_{}_{}", i, rng.random_range(1000..=9999))),
            content: Some(format!(
                "{} #{}",
                POST_TEMPLATES[i % POST_TEMPLATES.len()],
                pick(rng, HASHTAGS)
            )),
            like_count: rng.random_range(50..=1000),
            comment_count: rng.random_range(5..=100),
            share_count: rng.random_range(1..=50),
            posted_at: Some(now - i as i64 * 2 * DAY_MILLIS),
            media_type: Some(pick(rng, MEDIA_TYPES).to_string()),
            comments: mock_comments(rng, MOCK_COMMENTS_PER_POST, now),
            ..Default::default()
        })
        .collect()
}

pub fn mock_comments<R: Rng + ?Sized>(rng: &mut R, count: usize, now: i64) -> Vec<ScrapedComment> {
    (0..count)
        .map(|_| ScrapedComment {
            author_name: Some(pick(rng, COMMENTER_NAMES).to_string()),
            content: Some(pick(rng, COMMENT_TEXTS).to_string()),
            like_count: rng.random_range(1..=20),
            commented_at: Some(now - rng.random_range(1..=48) * HOUR_MILLIS),
            ..Default::default()
        })
        .collect()
}

pub fn mock_employees<R: Rng + ?Sized>(rng: &mut R) -> Vec<ScrapedUser> {
    mock_people(rng, MOCK_EMPLOYEE_COUNT)
}

pub fn mock_followers<R: Rng + ?Sized>(rng: &mut R) -> Vec<ScrapedUser> {
    mock_people(rng, MOCK_FOLLOWER_COUNT)
}

/// Names are unique within one batch, since users are matched by full name.
fn mock_people<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<ScrapedUser> {
    let count = count.min(FIRST_NAMES.len() * LAST_NAMES.len());
    let mut used = HashSet::with_capacity(count);
    (0..count)
        .map(|_| {
            let (first, last) = loop {
                let candidate = (pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
                if used.insert(candidate) {
                    break candidate;
                }
            };
            let title = pick(rng, JOB_TITLES);
            let first_initial = &first[..1];
            let last_initial = &last[..1];
            ScrapedUser {
                full_name: format!("{} {}", first, last),
                username: Some(format!("{}.{}", first.to_lowercase(), last.to_lowercase())),
                headline: Some(title.to_string()),
                job_title: Some(title.to_string()),
                location: Some(pick(rng, LOCATIONS).to_string()),
                profile_url: Some(format!(
                    "https://linkedin.com/in/{}{}",
                    first.to_lowercase(),
                    last.to_lowercase()
                )),
                profile_picture: Some(format!(
                    "https://placehold.co/100x100/6366f1/white?text={}{}",
                    first_initial, last_initial
                )),
            }
        })
        .collect()
}
