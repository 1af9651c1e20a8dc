use anyhow::Result;
use chrono::{DateTime, Local};
use serenity::all::{Context, Message};
use tracing::debug;

use crate::calc;
use crate::rng::Roller;

const HELP_TEXT: &str = "📖 コマンド一覧\n\
    `!user` / `!profile` - あなたのプロフィールを表示\n\
    `!server` - サーバー情報を表示\n\
    `!help` - このヘルプを表示\n\
    `!coin` - コイントス\n\
    `!dice [面数]` - サイコロを振る (デフォルト6面)\n\
    `!random [最小] [最大]` - 範囲内の乱数 (デフォルト1〜100)\n\
    `!echo [テキスト]` - テキストをそのまま返す\n\
    `!time` - 現在時刻を表示\n\
    `!calc [式]` - 計算する\n\
    `!joke` - ジョークを言う";

const JOKES: &[&str] = &[
    "布団が吹っ飛んだ！ 🛏️",
    "アルミ缶の上にあるミカン 🍊",
    "イクラはいくら？ 🍣",
    "パンはパンでも食べられないパンは…フライパン！ 🍳",
    "猫が寝込んだ… 🐱",
    "電話に誰も出んわ ☎️",
];

/// A prefix command split into its name and raw tokens.
/// `args[0]` is always the name token before lowercasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Parse `raw` as a prefix command; `None` when the prefix is missing or
    /// nothing follows it.
    pub fn parse(raw: &str, prefix: char) -> Option<Self> {
        let rest = raw.strip_prefix(prefix)?;
        let args: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        let name = args.first()?.to_lowercase();
        Some(ParsedCommand { name, args })
    }
}

/// Route a parsed command to its handler. `Ok(None)` means no reply is owed:
/// either the name matched nothing (silently ignored) or `server` was used
/// outside a guild.
pub async fn dispatch(
    ctx: &Context,
    msg: &Message,
    cmd: &ParsedCommand,
    roller: &mut Roller,
) -> Result<Option<String>> {
    let rest = &cmd.args[1..];
    let reply = match cmd.name.as_str() {
        "user" | "profile" => Some(profile_block(
            &msg.author.tag(),
            msg.author.id.get(),
            msg.author.created_at().unix_timestamp(),
        )),
        "server" => server_info(ctx, msg).await?,
        "help" => Some(HELP_TEXT.to_string()),
        "coin" => Some(coin(roller)),
        "dice" => Some(dice(rest, roller)),
        "random" => Some(random_range(rest, roller)),
        "echo" => Some(echo(rest)),
        "time" => Some(time_now()),
        "calc" => Some(calculate(rest)),
        "joke" => Some(joke(roller)),
        other => {
            debug!("Ignoring unknown command: {}", other);
            None
        }
    };
    Ok(reply)
}

async fn server_info(ctx: &Context, msg: &Message) -> Result<Option<String>> {
    // Guild-only; in DMs the command is silently guarded.
    let Some(guild_id) = msg.guild_id else {
        return Ok(None);
    };
    let guild = guild_id.to_partial_guild_with_counts(&ctx.http).await?;
    Ok(Some(server_block(
        &guild.name,
        guild.approximate_member_count,
        guild_id.get(),
        guild_id.created_at().unix_timestamp(),
    )))
}

fn profile_block(tag: &str, id: u64, created_unix: i64) -> String {
    format!(
        "👤 プロフィール\nタグ: {}\nID: {}\nアカウント作成日: {}",
        tag,
        id,
        format_date(created_unix)
    )
}

fn server_block(name: &str, member_count: Option<u64>, id: u64, created_unix: i64) -> String {
    let members = member_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "不明".to_string());
    format!(
        "🏠 サーバー情報\n名前: {}\nメンバー数: {}\nID: {}\n作成日: {}",
        name,
        members,
        id,
        format_date(created_unix)
    )
}

fn format_date(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|| "不明".to_string())
}

fn coin(roller: &mut Roller) -> String {
    if roller.coin() {
        "🪙 表！".to_string()
    } else {
        "🪙 裏！".to_string()
    }
}

fn dice(args: &[String], roller: &mut Roller) -> String {
    let sides = match args.first() {
        None => 6,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => n,
            Err(_) => return "⚠️ サイコロの面数は2以上の整数で指定してください".to_string(),
        },
    };
    if sides < 2 {
        return "⚠️ サイコロの面数は2以上の整数で指定してください".to_string();
    }
    format!("🎲 {}", roller.range(1, sides))
}

fn random_range(args: &[String], roller: &mut Roller) -> String {
    let min = match args.first() {
        None => 1,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => n,
            Err(_) => return "⚠️ 最小値と最大値は整数で指定してください".to_string(),
        },
    };
    let max = match args.get(1) {
        None => 100,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => n,
            Err(_) => return "⚠️ 最小値と最大値は整数で指定してください".to_string(),
        },
    };
    format!("🔢 {}", roller.range(min, max))
}

fn echo(args: &[String]) -> String {
    if args.is_empty() {
        "⚠️ 繰り返すテキストを入力してください".to_string()
    } else {
        args.join(" ")
    }
}

fn time_now() -> String {
    format!(
        "🕐 現在時刻: {}",
        Local::now().format("%Y年%m月%d日 %H:%M:%S")
    )
}

fn calculate(args: &[String]) -> String {
    let expr: String = args.concat();
    let whitelisted = !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_ascii_digit() || "+-*/.()".contains(c));
    if !whitelisted {
        return "⚠️ 計算式には数字と + - * / . ( ) のみ使えます".to_string();
    }
    match calc::evaluate(&expr) {
        Ok(value) if value.is_finite() => {
            format!("🧮 計算結果: **{} = {}**", expr, format_number(value))
        }
        _ => "⚠️ その式は計算できませんでした".to_string(),
    }
}

/// Drop the fractional part when the result is a whole number, so `2+2*3`
/// reads `8` rather than `8.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn joke(roller: &mut Roller) -> String {
    roller.pick(JOKES).to_string()
}
