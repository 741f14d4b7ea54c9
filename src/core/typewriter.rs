//! 打字机效果：把完整文本展开为逐字增长的前缀流
//!
//! 第 i 项是前 i 个字符（按 Unicode 标量，不会截断 UTF-8）；每项产出后、下一次拉取前挂起一个间隔，
//! 因此 N 个字符恰好 N 次挂起，空文本不挂起。

use std::time::Duration;

use futures_util::{stream, Stream};

struct Reveal {
    text: String,
    /// 已展示部分的字节长度
    end: usize,
    ticked: bool,
    interval: Duration,
}

pub fn typewriter(text: impl Into<String>, interval: Duration) -> impl Stream<Item = String> {
    let state = Reveal {
        text: text.into(),
        end: 0,
        ticked: false,
        interval,
    };
    stream::unfold(state, |mut st| async move {
        if st.ticked {
            tokio::time::sleep(st.interval).await;
        }
        let Some(next) = st.text[st.end..].chars().next() else {
            return None;
        };
        st.end += next.len_utf8();
        st.ticked = true;
        let prefix = st.text[..st.end].to_string();
        Some((prefix, st))
    })
}
