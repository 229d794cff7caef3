//! User-facing strings. All of them are sent with `ParseMode::Html`.

pub const START_BUTTON: &str = "🎬 Start download";
pub const HELP_BUTTON: &str = "📊 Help";
pub const CANCEL_BUTTON: &str = "❌ Cancel";
pub const BACK_BUTTON: &str = "🔙 Back";

pub const WELCOME: &str = "👋 <b>Welcome!</b>\n\n\
    I download YouTube videos in the quality you pick and send them right here.\n\n\
    Press the button below or send /download to begin.";

pub const HELP: &str = "📚 <b>How to use the bot:</b>\n\n\
    1️⃣ <b>Start:</b> press 🎬 Start download or send /download\n\n\
    2️⃣ <b>Send the link:</b> any youtube.com or youtu.be link, short or long\n\n\
    3️⃣ <b>Pick a quality:</b> every available resolution is listed from the smallest \
    to the largest, with its approximate size\n\n\
    4️⃣ <b>Wait:</b> the bot downloads the video and sends it to you\n\n\
    ⚠️ Large videos take a while. Send /cancel at any time to start over.";

pub const HELP_SHORT: &str = "📚 <b>Help</b>\n\n\
    This bot downloads YouTube videos in different qualities.\n\n\
    🚀 <b>To begin:</b> press the start button";

pub const ASK_URL: &str = "🎬 <b>Okay!</b> Send me the YouTube link now:";

pub const ASK_URL_WITH_HINTS: &str = "🎬 <b>Okay!</b> Send me the YouTube link now:\n\n\
    💡 <i>Supported links:</i>\n\
    • youtube.com/watch?v=...\n\
    • youtu.be/...\n\
    • youtube.com/shorts/...";

pub const INVALID_LINK: &str = "❌ <b>Invalid link!</b>\n\nPlease send a YouTube link.";

pub const ANALYZING: &str = "🔍 <b>Analyzing the video...</b>";

pub const NO_FORMATS: &str = "❌ <b>No qualities available!</b>\n\
    The video may be protected or unavailable.";

pub const CANCELLED: &str = "❌ <b>Cancelled</b>\n\nSend /start to begin again";

pub const SESSION_EXPIRED: &str = "❌ Session expired, start again";

pub const FILE_NOT_FOUND: &str = "❌ <b>Could not find the file after downloading</b>";

pub const UPLOADING: &str = "✅ <b>Downloaded!</b>\n📤 <b>Uploading...</b>";
