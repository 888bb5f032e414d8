//! Headless scripted driver.
//!
//! Plays a seeded session with a greedy placement policy: every candidate
//! (rotation, column) is explored through `simulate`, the resulting stacks
//! are scored with the weighted board heuristics, and the best candidate's
//! action sequence is replayed onto the real session. Optionally dumps the
//! planner exchange JSON before the first placement.

use anyhow::{anyhow, Result};

use headless_tetris::{GameAction, GameConfig, GameMode, GameSession, PlannerRequest};

/// Heuristic weights over (aggregate height, complete lines, holes,
/// bumpiness), from the original training setup.
const WEIGHTS: [f32; 4] = [-0.510066, 0.760666, -0.35663, -0.184483];

struct Args {
    mode: GameMode,
    seed: u32,
    max_pieces: u32,
    dump_request: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        mode: GameMode::Endless,
        seed: 1,
        max_pieces: 200,
        dump_request: None,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                i += 1;
                let v = args.get(i).ok_or_else(|| anyhow!("missing value for --mode"))?;
                parsed.mode = match v.to_ascii_lowercase().as_str() {
                    "endless" => GameMode::Endless,
                    "sprint" => GameMode::Sprint,
                    "blitz" => GameMode::Blitz,
                    other => return Err(anyhow!("unknown mode: {}", other)),
                };
            }
            "--seed" => {
                i += 1;
                let v = args.get(i).ok_or_else(|| anyhow!("missing value for --seed"))?;
                parsed.seed = v.parse().map_err(|_| anyhow!("invalid --seed value: {}", v))?;
            }
            "--pieces" => {
                i += 1;
                let v = args.get(i).ok_or_else(|| anyhow!("missing value for --pieces"))?;
                parsed.max_pieces = v
                    .parse()
                    .map_err(|_| anyhow!("invalid --pieces value: {}", v))?;
            }
            "--dump-request" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --dump-request"))?;
                parsed.dump_request = Some(v.clone());
            }
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

/// Action sequence for one candidate placement.
fn candidate_plan(rotations: u8, shift: i8) -> Vec<GameAction> {
    let mut plan = Vec::new();
    for _ in 0..rotations {
        plan.push(GameAction::RotateCw);
    }
    let step = if shift < 0 {
        GameAction::MoveLeft
    } else {
        GameAction::MoveRight
    };
    for _ in 0..shift.unsigned_abs() {
        plan.push(step);
    }
    plan.push(GameAction::HardDrop);
    plan
}

/// Greedy one-piece lookahead over every rotation and horizontal shift.
fn best_plan(session: &GameSession) -> Vec<GameAction> {
    let mut best = vec![GameAction::HardDrop];
    let mut best_score = f32::NEG_INFINITY;

    for rotations in 0..4u8 {
        for shift in -5i8..=5 {
            let plan = candidate_plan(rotations, shift);
            let mut probe = session.clone();
            for &action in &plan {
                probe.step(action);
            }
            let score = probe.matrix().evaluate(WEIGHTS);
            if score > best_score {
                best_score = score;
                best = plan;
            }
        }
    }

    best
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let mut session = GameSession::new(GameConfig::new(args.mode, args.seed));

    if let Some(path) = &args.dump_request {
        let request = PlannerRequest::capture(&session)
            .ok_or_else(|| anyhow!("session has no active piece"))?;
        std::fs::write(path, request.to_json()?)?;
        println!("planner request written to {}", path);
    }

    while !session.is_game_over() && session.total_pieces_placed() < args.max_pieces {
        for action in best_plan(&session) {
            session.step(action);
            if session.is_game_over() {
                break;
            }
        }
    }

    println!("mode:    {:?}", session.mode());
    println!("pieces:  {}", session.total_pieces_placed());
    println!("lines:   {}", session.lines());
    println!("score:   {}", session.score());
    match session.game_over_condition() {
        Some(condition) => println!("result:  {}", condition.label()),
        None => println!("result:  piece limit reached"),
    }

    Ok(())
}
