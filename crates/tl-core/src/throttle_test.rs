use super::*;
use tokio::io::AsyncReadExt;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_single_byte_per_read() {
    let mut reader = ThrottledReader::new(&b"CREATE TABLE t (id INT);"[..]);
    let mut buf = [0u8; 64];

    let n = reader.read(&mut buf).await.unwrap();
    assert_eq!(n, 1);
    assert_eq!(buf[0], b'C');

    let n = reader.read(&mut buf).await.unwrap();
    assert_eq!(n, 1);
    assert_eq!(buf[0], b'R');
}

#[tokio::test(start_paused = true)]
async fn test_read_to_end_collects_everything() {
    let body = b"SELECT 1;";
    let mut reader = ThrottledReader::with_delay(&body[..], Duration::from_millis(5));

    let start = Instant::now();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();

    assert_eq!(out, body);
    // One delay per byte plus one for the final EOF read
    assert!(start.elapsed() >= Duration::from_millis(5) * body.len() as u32);
}

#[tokio::test(start_paused = true)]
async fn test_eof_returns_zero() {
    let mut reader = ThrottledReader::new(&b""[..]);
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_delay_applied_before_each_byte() {
    let mut reader = ThrottledReader::with_delay(&b"ab"[..], Duration::from_secs(1));
    let mut buf = [0u8; 2];

    let start = Instant::now();
    reader.read(&mut buf).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(1));

    reader.read(&mut buf).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_read_loses_no_bytes() {
    let mut reader = ThrottledReader::with_delay(&b"xyz"[..], Duration::from_secs(10));
    let mut buf = [0u8; 4];

    // Give up long before the delay elapses
    let timed_out =
        tokio::time::timeout(Duration::from_secs(1), reader.read(&mut buf)).await;
    assert!(timed_out.is_err());

    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    assert_eq!(out, b"xyz");
}
