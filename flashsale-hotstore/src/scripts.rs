//! The four Lua scripts that give the hot store linearizable multi-key
//! admission and transitions.
//!
//! Redis runs Lua scripts single-threaded against its own event loop, so
//! each script below executes as one indivisible unit with respect to every
//! other client — atomic multi-key admission without a distributed lock.
//! The scripts are a direct port of the reference implementation's
//! (`examples/original_source/internal/cache/constants.go`) Lua bodies; the
//! sentinel return codes are preserved so the two implementations stay
//! auditable against each other.

use std::sync::LazyLock;

use redis::Script;

/// Sentinel returned by [`RESERVE_TICKET`] when the showtime is sold out.
pub const SOLD_OUT: i64 = -1;
/// Sentinel returned by [`RESERVE_TICKET`] when the user already holds a
/// reservation for this showtime.
pub const ALREADY_ORDERED: i64 = -3;
/// Sentinel returned by [`MARK_PAID`]/[`MARK_TIMEOUT`] when the reservation
/// was not in `RESERVED` status.
pub const INVALID_STATE: i64 = -2;

/// `SET`s every `ARGV[i], ARGV[i+1]` pair as a key/value. Used once at
/// startup to seed every showtime's remaining-ticket counter.
pub static INIT_TICKETS: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        for i = 1, #ARGV, 2 do
            local key = ARGV[i]
            local value = tonumber(ARGV[i + 1])
            redis.call('SET', key, value)
        end
        return #ARGV / 2
        ",
    )
});

/// `KEYS = [remaining, id_seq, user_ordered]`, `ARGV = [showtime_id, user_id]`.
///
/// Returns the new reservation id, or [`SOLD_OUT`] / [`ALREADY_ORDERED`].
pub static RESERVE_TICKET: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local user_ordered_key = KEYS[3]
        local has_ordered = redis.call('GET', user_ordered_key)
        if has_ordered then
            return -3
        end

        local remain = tonumber(redis.call('GET', KEYS[1]))
        if (not remain) or remain <= 0 then
            return -1
        end

        redis.call('DECR', KEYS[1])

        local id = redis.call('INCR', KEYS[2])
        local res_key = 'reservation:' .. id

        redis.call('HSET', res_key,
            'showtime_id', ARGV[1],
            'user_id', ARGV[2],
            'status', 'RESERVED'
        )

        redis.call('SET', user_ordered_key, 'true')

        return id
        ",
    )
});

/// `KEYS = [reservation_key]`. Returns `1` on success, [`INVALID_STATE`] if
/// the reservation was not `RESERVED`.
pub static MARK_PAID: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local res_key = KEYS[1]
        local status = redis.call('HGET', res_key, 'status')
        if (not status) or status ~= 'RESERVED' then
            return -2
        end

        redis.call('HSET', res_key, 'status', 'PAID')
        return 1
        ",
    )
});

/// `KEYS = [reservation_key]`. On success, also increments the owning
/// showtime's remaining-ticket counter in the same atomic unit. Returns `1`
/// on success, [`INVALID_STATE`] if the reservation was not `RESERVED`.
pub static MARK_TIMEOUT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local res_key = KEYS[1]
        local status = redis.call('HGET', res_key, 'status')
        local showtime_id = redis.call('HGET', res_key, 'showtime_id')

        if (not status) or status ~= 'RESERVED' then
            return -2
        end

        local remain_key = 'showtime:' .. showtime_id .. ':ticket:remain'

        redis.call('HSET', res_key, 'status', 'TIMEOUT')
        redis.call('INCR', remain_key)

        return 1
        ",
    )
});
