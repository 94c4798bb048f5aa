use rand::Rng;
use serde::Serialize;

#[derive(Serialize)]
pub struct Context {
    pub site: String,
    pub members: Vec<Member>,
}

#[derive(Serialize)]
pub struct Member {
    pub handle: String,
    pub role: Role,
    pub karma: i64,
    pub tags: Vec<String>,
    pub banned: bool,
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Reader,
}

/// A random member directory with `n` members.
pub fn random(n: usize) -> Context {
    let mut rng = rand::thread_rng();
    let site = word(&mut rng, 12);
    let members = (0..n)
        .map(|_| {
            let role = match rng.gen_range(0..10) {
                0 => Role::Admin,
                1..=3 => Role::Editor,
                _ => Role::Reader,
            };
            let tags = (0..rng.gen_range(0..4)).map(|_| word(&mut rng, 6)).collect();
            Member {
                handle: word(&mut rng, 16),
                role,
                karma: rng.gen_range(-50..5000),
                tags,
                banned: rng.gen_ratio(1, 8),
            }
        })
        .collect();
    Context { site, members }
}

fn word(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range('a'..='z')).collect()
}
